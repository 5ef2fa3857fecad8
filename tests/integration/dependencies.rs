//! Asset discovery across template chains

use anyhow::Result;
use pugdep::templating::emit_module;
use pugdep::{Resolver, ResolverConfig};

use crate::common::TestProject;

#[test]
fn test_each_template_lists_only_its_own_assets() -> Result<()> {
    let project = TestProject::with_site()?;
    let mut resolver = Resolver::new(&ResolverConfig::default())?;
    let artifact = resolver.resolve(&project.path("views/index.pug"))?;

    assert_eq!(
        artifact.deps.get(&project.path("views/index.pug")),
        Some(&[project.path("views/img/hero.jpg")][..])
    );
    assert_eq!(artifact.deps.get(&project.path("views/layout.pug")), Some(&[][..]));
    assert_eq!(
        artifact.deps.get(&project.path("views/partials/header.pug")),
        Some(&[project.path("assets/logo.png")][..])
    );
    Ok(())
}

#[test]
fn test_every_dependency_appears_in_content() -> Result<()> {
    let project = TestProject::with_site()?;
    let mut resolver = Resolver::new(&ResolverConfig::default())?;
    let artifact = resolver.resolve(&project.path("views/index.pug"))?;

    let all = artifact.all_dependencies();
    assert_eq!(all.len(), 2);
    for dep in all {
        assert!(dep.is_absolute());
        assert!(artifact.content.contains(&dep.display().to_string()));
    }
    // Only `img:src` is configured by default
    assert!(artifact.content.contains("script(src='/js/app.js')"));
    Ok(())
}

#[test]
fn test_any_tag_pattern_from_config() -> Result<()> {
    let project = TestProject::new()?;
    project.write(
        "views/gallery.pug",
        "section(data-bg='bg.jpg')\n  picture\n    source(data-src='a.webp')\n    img(src='a.jpg' data-src='a-2x.jpg')",
    )?;

    let config = ResolverConfig {
        attributes: vec![":data-src".into(), "section:data-bg".into()],
        ..ResolverConfig::default()
    };
    let mut resolver = Resolver::new(&config)?;
    let artifact = resolver.resolve(&project.path("views/gallery.pug"))?;

    assert_eq!(
        artifact.all_dependencies(),
        vec![
            project.path("views/bg.jpg"),
            project.path("views/a.webp"),
            project.path("views/a-2x.jpg")
        ]
    );
    // `img:src` is not configured here
    assert!(artifact.content.contains("img(src='a.jpg' data-src="));
    Ok(())
}

#[test]
fn test_module_requires_every_asset() -> Result<()> {
    let project = TestProject::with_site()?;
    let mut resolver = Resolver::new(&ResolverConfig::default())?;
    let artifact = resolver.resolve(&project.path("views/index.pug"))?;

    let module = emit_module(&artifact);
    for dep in artifact.all_dependencies() {
        let literal = serde_json::to_string(&dep.display().to_string())?;
        assert!(module.contains(&format!("require({literal})")), "missing require for {literal}");
    }
    assert!(module.trim_end().ends_with("module.exports = tpl;"));
    Ok(())
}
