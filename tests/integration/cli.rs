//! The `pugdep` binary end to end

use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_resolve_prints_document() -> Result<()> {
    let project = TestProject::with_site()?;
    project
        .command()
        .args(["resolve", "views/index"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    h1 Welcome\n"))
        .stdout(predicate::str::contains("script(src='/js/index.js')"))
        .stdout(predicate::str::contains("block").not());
    Ok(())
}

#[test]
fn test_resolve_json_and_output_file() -> Result<()> {
    let project = TestProject::with_site()?;
    project
        .command()
        .args(["resolve", "views/index.pug", "--format", "json", "--output", "dist/index.json"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json: serde_json::Value = serde_json::from_str(&project.read("dist/index.json")?)?;
    let deps = json["deps"].as_object().expect("deps is an object");
    assert_eq!(deps.len(), 3);
    assert!(json["content"].as_str().is_some_and(|c| c.contains("h1 Welcome")));
    Ok(())
}

#[test]
fn test_resolve_module_format() -> Result<()> {
    let project = TestProject::with_site()?;
    project
        .command()
        .args(["resolve", "views/index.pug", "-f", "module"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("var requirePaths = {};"))
        .stdout(predicate::str::contains("hero.jpg\")"))
        .stdout(predicate::str::contains("module.exports = tpl;"));
    Ok(())
}

#[test]
fn test_deps_flat() -> Result<()> {
    let project = TestProject::with_site()?;
    let hero = project.path("views/img/hero.jpg");
    let logo = project.path("assets/logo.png");

    project
        .command()
        .args(["deps", "views/index.pug", "--flat"])
        .assert()
        .success()
        .stdout(format!("{}\n{}\n", hero.display(), logo.display()));
    Ok(())
}

#[test]
fn test_deps_grouped_marks_templates_without_assets() -> Result<()> {
    let project = TestProject::with_site()?;
    project
        .command()
        .args(["deps", "views/index.pug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("layout.pug (no assets)"));
    Ok(())
}

#[test]
fn test_attr_flag_overrides_config_file() -> Result<()> {
    let project = TestProject::new()?;
    project.write("pugdep.toml", "attributes = [\"img:src\"]\n")?;
    project.write("views/page.pug", "video(poster='p.jpg')\nimg(src='i.png')")?;

    project
        .command()
        .args(["deps", "views/page.pug", "--flat", "--attr", "video:poster"])
        .assert()
        .success()
        .stdout(predicate::str::contains("p.jpg"))
        .stdout(predicate::str::contains("i.png").not());
    Ok(())
}

#[test]
fn test_config_file_settings_apply() -> Result<()> {
    let project = TestProject::new()?;
    project.write("site.toml", "indent-unit = 4\n")?;
    project.write("views/page.pug", "ul\n  li one")?;

    project
        .command()
        .args(["--config", "site.toml", "resolve", "views/page.pug"])
        .assert()
        .success()
        .stdout("ul\n    li one\n");
    Ok(())
}

#[test]
fn test_missing_template_fails_with_suggestion() -> Result<()> {
    let project = TestProject::new()?;
    project.write("views/page.pug", "extends nowhere\nblock content\n  p x")?;

    project
        .command()
        .args(["resolve", "views/page.pug"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Template not found"))
        .stderr(predicate::str::contains("nowhere.pug"))
        .stderr(predicate::str::contains("suggestion"));
    Ok(())
}

#[test]
fn test_syntax_error_names_file_and_line() -> Result<()> {
    let project = TestProject::new()?;
    project.write("views/page.pug", "div\n  img(src='a.png'\n")?;

    project
        .command()
        .args(["resolve", "views/page.pug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page.pug:2"));
    Ok(())
}

#[test]
fn test_invalid_attr_pattern_rejected() -> Result<()> {
    let project = TestProject::new()?;
    project.write("views/page.pug", "p hi")?;

    project
        .command()
        .args(["resolve", "views/page.pug", "--attr", "src"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid attribute pattern `src`"));
    Ok(())
}
