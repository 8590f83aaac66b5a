use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_extract_writes_units() -> Result<()> {
    let test = CliTest::with_file(
        "src/page.tsx",
        r#"import { T, useGT } from "gt-next";

export function Page() {
    const t = useGT();
    return (
        <T id="greeting">
            Hello <b>World</b>
        </T>
    );
}

export function Title() {
    const t = useGT();
    return <h1>{t("Hi {name}", { $context: "header" })}</h1>;
}
"#,
    )?;

    let (output, units) = test.extract_units()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(units.len(), 2);

    insta::assert_snapshot!(
        units[0]["source"].to_string(),
        @r#"["Hello ",{"type":"b","props":{"children":"World"}}]"#
    );
    assert_eq!(units[0]["dataFormat"], "JSX");
    assert_eq!(units[0]["metadata"]["id"], "greeting");
    assert_eq!(units[0]["metadata"]["filePaths"], json!(["./src/page.tsx"]));
    assert_eq!(units[0]["metadata"]["hash"].as_str().map(str::len), Some(64));

    assert_eq!(units[1]["dataFormat"], "ICU");
    assert_eq!(units[1]["source"], "Hi {name}");
    assert_eq!(units[1]["metadata"]["context"], "header");

    assert!(
        stdout(&output)
            .contains("Extracted 2 translation units from 1 source file into updates.json")
    );
    Ok(())
}

#[test]
fn test_extract_reports_blocking_errors() -> Result<()> {
    let test = CliTest::with_file(
        "src/page.tsx",
        r#"import { T } from "gt-next";
export function Page({ name }) {
  return <T>Hello {name}</T>;
}
export const Ok = () => <T>Fine</T>;
"#,
    )?;

    let (output, units) = test.extract_units()?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(units.len(), 1);
    assert_eq!(units[0]["source"], "Fine");

    let stdout = stdout(&output);
    assert!(stdout.contains(
        "error: <T> has children that could change at runtime: {name}  unwrapped-expression"
    ));
    assert!(stdout.contains("--> ./src/page.tsx:3:10"));
    assert!(stdout.contains("3 |   return <T>Hello {name}</T>;"));
    assert!(stdout.contains("1 problems (1 error, 0 warnings)"));
    Ok(())
}

#[test]
fn test_extract_static_functions_across_files() -> Result<()> {
    let test = CliTest::with_file(
        "src/lib/labels.ts",
        r#"export function roleLabel(admin: boolean) {
    if (admin) {
        return "Administrator";
    }
    return "Member";
}
"#,
    )?;
    test.write_file(
        "src/page.tsx",
        r#"import { T, Static } from "gt-next";
import { roleLabel } from "./lib/labels";

export const Badge = ({ admin }) => (
    <T>
        Signed in as <Static>{roleLabel(admin)}</Static>
    </T>
);
"#,
    )?;

    let (output, units) = test.extract_units()?;
    assert!(output.status.success(), "stdout: {}", stdout(&output));

    let sources: Vec<String> = units.iter().map(|u| u["source"].to_string()).collect();
    assert_eq!(
        sources,
        vec![
            r#"["Signed in as ","Administrator"]"#,
            r#"["Signed in as ","Member"]"#,
        ]
    );
    assert!(units.iter().all(|u| u["metadata"]["staticId"].is_string()));
    assert_ne!(units[0]["metadata"]["staticId"], units[1]["metadata"]["staticId"]);
    Ok(())
}

#[test]
fn test_extract_warnings_do_not_fail() -> Result<()> {
    let test = CliTest::with_file(
        "src/page.tsx",
        r#"import { T, Static } from "gt-next";
export const Page = () => <T>Hi <Static>{unknown()}</Static></T>;
"#,
    )?;

    let (output, units) = test.extract_units()?;
    assert!(output.status.success());
    assert_eq!(units.len(), 1);
    assert!(stdout(&output).contains("warning: cannot resolve `unknown` used inside <Static>"));
    Ok(())
}

#[test]
fn test_extract_with_source_root_and_config() -> Result<()> {
    let test = CliTest::with_file(
        "web/.jsxlaterc.json",
        r#"{ "includes": ["app"], "packages": ["@acme/i18n"] }"#,
    )?;
    test.write_file(
        "web/app/page.tsx",
        r#"import { T } from "@acme/i18n";
export const Page = () => <T>From web</T>;
"#,
    )?;
    test.write_file(
        "web/src/ignored.tsx",
        r#"import { T } from "@acme/i18n";
export const Page = () => <T>Not included</T>;
"#,
    )?;

    let output = test
        .extract_command()
        .args(["--source-root", "web"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Extracted 1 translation unit from 1 source file"));
    Ok(())
}

#[test]
fn test_extract_parse_error_is_reported_per_file() -> Result<()> {
    let test = CliTest::with_file("src/broken.tsx", "export const = <div")?;
    test.write_file(
        "src/page.tsx",
        r#"import { T } from "gt-next";
export const Page = () => <T>Still extracted</T>;
"#,
    )?;

    let (output, units) = test.extract_units()?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(units.len(), 1);
    assert!(stdout(&output).contains("--> ./src/broken.tsx\n"));
    Ok(())
}

#[test]
fn test_extract_invalid_config_is_an_internal_error() -> Result<()> {
    let test = CliTest::with_file(".jsxlaterc.json", "{ not json")?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_help_lists_commands() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("--help").output()?;
    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("extract"));
    assert!(help.contains("init"));
    Ok(())
}
