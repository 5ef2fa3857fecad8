//! Template composition through the public API

use anyhow::Result;
use pugdep::{PugdepError, Resolver, ResolverConfig};

use crate::common::TestProject;

fn resolve(project: &TestProject, entry: &str) -> Result<pugdep::ResolvedArtifact> {
    pugdep::test_utils::init_test_logging(None);
    let mut resolver = Resolver::new(&ResolverConfig::default())?;
    Ok(resolver.resolve(&project.path(entry))?)
}

#[test]
fn test_site_page_is_flattened() -> Result<()> {
    let project = TestProject::with_site()?;
    let artifact = resolve(&project, "views/index.pug")?;

    let logo = project.path("assets/logo.png");
    let hero = project.path("views/img/hero.jpg");
    let expected = format!(
        "doctype html\nhtml\n  head\n    title Site\n  body\n    header\n      img(src={})\n    h1 Welcome\n    img(src={})\n    script(src='/js/app.js')\n    script(src='/js/index.js')",
        logo.display(),
        hero.display()
    );
    assert_eq!(artifact.content, expected);
    assert_eq!(artifact.deps.len(), 3);
    Ok(())
}

#[test]
fn test_entry_without_extension() -> Result<()> {
    let project = TestProject::with_site()?;
    let with_ext = resolve(&project, "views/index.pug")?;
    let without_ext = resolve(&project, "views/index")?;
    assert_eq!(with_ext, without_ext);
    Ok(())
}

#[test]
fn test_three_level_inheritance() -> Result<()> {
    let project = TestProject::new()?;
    project.write("views/base.pug", "html\n  body\n    block nav\n      nav base\n    block content\n      p base")?;
    project.write(
        "views/section.pug",
        "extends base\nblock nav\n  nav section\nblock content\n  p section",
    )?;
    project.write("views/pages/article.pug", "extends ../section\nblock content\n  article page")?;

    let artifact = resolve(&project, "views/pages/article.pug")?;
    assert_eq!(artifact.content, "html\n  body\n    nav section\n    article page");

    let templates: Vec<_> = artifact.deps.templates().map(|p| p.to_path_buf()).collect();
    assert_eq!(
        templates,
        vec![
            project.path("views/pages/article.pug"),
            project.path("views/section.pug"),
            project.path("views/base.pug")
        ]
    );
    Ok(())
}

#[test]
fn test_includes_resolve_relative_to_their_template() -> Result<()> {
    let project = TestProject::new()?;
    project.write("views/page.pug", "main\n  include parts/card")?;
    project.write("views/parts/card.pug", "section.card\n  include ../shared/badge")?;
    project.write("views/shared/badge.pug", "span.badge new")?;

    let artifact = resolve(&project, "views/page.pug")?;
    assert_eq!(artifact.content, "main\n  section.card\n    span.badge new");
    assert_eq!(artifact.deps.len(), 3);
    Ok(())
}

#[test]
fn test_cycle_is_reported() -> Result<()> {
    let project = TestProject::new()?;
    project.write("views/a.pug", "div\n  include b")?;
    project.write("views/b.pug", "div\n  include a")?;

    let mut resolver = Resolver::new(&ResolverConfig::default())?;
    let err = resolver.resolve(&project.path("views/a.pug")).unwrap_err();
    assert!(matches!(err, PugdepError::CircularReference { .. }));
    assert!(err.to_string().contains("a.pug -> "));
    Ok(())
}

#[test]
fn test_missing_parent_is_reported() -> Result<()> {
    let project = TestProject::new()?;
    project.write("views/page.pug", "extends nowhere\nblock content\n  p x")?;

    let mut resolver = Resolver::new(&ResolverConfig::default())?;
    let err = resolver.resolve(&project.path("views/page.pug")).unwrap_err();
    match err {
        PugdepError::FileNotFound {
            path,
        } => assert_eq!(path, project.path("views/nowhere.pug")),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_invalid_pattern_fails_before_io() {
    let config = ResolverConfig {
        attributes: vec!["img".into()],
        ..ResolverConfig::default()
    };
    let err = Resolver::new(&config).unwrap_err();
    assert!(matches!(err, PugdepError::InvalidAttributePattern { .. }));
}
