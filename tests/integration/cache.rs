//! Record reuse and mtime-driven reloads

use anyhow::Result;
use pugdep::test_utils::MemoryFileSystem;
use pugdep::templating::PugLexer;
use pugdep::{Resolver, ResolverConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn resolver(fs: &MemoryFileSystem) -> Result<Resolver<MemoryFileSystem>> {
    let config = ResolverConfig::default().validate()?;
    Ok(Resolver::with_parts(config, fs.clone(), Arc::new(PugLexer)))
}

#[test]
fn test_unchanged_templates_are_read_once() -> Result<()> {
    let fs = MemoryFileSystem::new();
    fs.insert("/site/layout.pug", "body\n  block content");
    fs.insert("/site/a.pug", "extends layout\nblock content\n  p a");
    fs.insert("/site/b.pug", "extends layout\nblock content\n  p b");

    let mut resolver = resolver(&fs)?;
    assert_eq!(resolver.resolve(Path::new("/site/a.pug"))?.content, "body\n  p a");
    assert_eq!(resolver.resolve(Path::new("/site/b.pug"))?.content, "body\n  p b");
    assert_eq!(resolver.resolve(Path::new("/site/a.pug"))?.content, "body\n  p a");

    assert_eq!(fs.reads("/site/layout.pug"), 1);
    assert_eq!(resolver.store().len(), 3);
    Ok(())
}

#[test]
fn test_parent_change_is_picked_up() -> Result<()> {
    let fs = MemoryFileSystem::new();
    fs.insert("/site/layout.pug", "body\n  block content");
    fs.insert("/site/a.pug", "extends layout\nblock content\n  p a");

    let mut resolver = resolver(&fs)?;
    resolver.resolve(Path::new("/site/a.pug"))?;
    assert!(!resolver.store().is_stale(Path::new("/site/layout.pug")));

    fs.write_keep_mtime("/site/layout.pug", "main\n  block content");
    fs.touch("/site/layout.pug", Duration::from_secs(1));
    assert!(resolver.store().is_stale(Path::new("/site/layout.pug")));

    assert_eq!(resolver.resolve(Path::new("/site/a.pug"))?.content, "main\n  p a");
    assert_eq!(fs.reads("/site/layout.pug"), 2);
    assert_eq!(fs.reads("/site/a.pug"), 1);
    Ok(())
}

#[test]
fn test_invalidate_then_missing_file() -> Result<()> {
    let fs = MemoryFileSystem::new();
    fs.insert("/site/page.pug", "div\n  include part");
    fs.insert("/site/part.pug", "p part");

    let mut resolver = resolver(&fs)?;
    resolver.resolve(Path::new("/site/page.pug"))?;

    fs.remove("/site/part.pug");
    assert!(resolver.store_mut().invalidate_if_stale(Path::new("/site/part.pug")).is_err());
    assert!(!resolver.store().contains(Path::new("/site/part.pug")));
    assert!(resolver.resolve(Path::new("/site/page.pug")).is_err());
    Ok(())
}
