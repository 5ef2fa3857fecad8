//! Tests for template composition and dependency collection.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ResolverConfig;
use crate::core::PugdepError;
use crate::templating::lexer::PugLexer;
use crate::templating::resolver::Resolver;
use crate::templating::ResolvedArtifact;
use crate::test_utils::{MemoryFileSystem, init_test_logging};

fn resolver_with(fs: &MemoryFileSystem, config: ResolverConfig) -> Resolver<MemoryFileSystem> {
    init_test_logging(None);
    let config = config.validate().unwrap();
    Resolver::with_parts(config, fs.clone(), Arc::new(PugLexer))
}

fn resolver(fs: &MemoryFileSystem) -> Resolver<MemoryFileSystem> {
    resolver_with(fs, ResolverConfig::default())
}

fn resolve(fs: &MemoryFileSystem, entry: &str) -> ResolvedArtifact {
    resolver(fs).resolve(Path::new(entry)).unwrap()
}

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

#[test]
fn test_extends_and_include() {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/views/layout.pug",
        "doctype html\nhtml\n  head\n    block head\n      title Default\n  body\n    include partials/nav\n    block content\n      p default content",
    );
    fs.insert("/views/partials/nav.pug", "nav\n  ul\n    li: a(href='/') Home");
    fs.insert(
        "/views/page.pug",
        "extends layout\nblock content\n  h1 Title\n  img(src='./img/a.png')\n  p body",
    );

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(
        artifact.content,
        "doctype html\nhtml\n  head\n    title Default\n  body\n    nav\n      ul\n        li: a(href='/') Home\n    h1 Title\n    img(src=/views/img/a.png)\n    p body"
    );

    let templates: Vec<_> = artifact.deps.templates().collect();
    assert_eq!(
        templates,
        vec![
            Path::new("/views/page.pug"),
            Path::new("/views/layout.pug"),
            Path::new("/views/partials/nav.pug")
        ]
    );
    assert_eq!(artifact.deps.get(Path::new("/views/page.pug")), Some(&paths(&["/views/img/a.png"])[..]));
    assert_eq!(artifact.deps.get(Path::new("/views/layout.pug")), Some(&[][..]));
}

#[test]
fn test_replace_splices_at_block_depth() {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/views/layout.pug",
        "html\n  body\n    main\n      block content\n        p default\n    footer",
    );
    fs.insert("/views/page.pug", "extends layout\nblock content\n  h1 One\n  p two\n  p three");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(
        artifact.content,
        "html\n  body\n    main\n      h1 One\n      p two\n      p three\n    footer"
    );
    assert_eq!(artifact.deps.len(), 2);
}

#[test]
fn test_block_without_override_keeps_body() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "html\n  block content\n    p default\n      span nested");

    let artifact = resolve(&fs, "/views/layout.pug");
    assert_eq!(artifact.content, "html\n  p default\n    span nested");
}

#[test]
fn test_nearest_override_wins() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/c.pug", "html\n  body\n    block content\n      p from c");
    fs.insert("/views/b.pug", "extends c\nblock content\n  p from b");
    fs.insert("/views/a.pug", "extends b\nblock content\n  p from a");

    let artifact = resolve(&fs, "/views/a.pug");
    assert_eq!(artifact.content, "html\n  body\n    p from a");
    assert!(!artifact.content.contains("from b"));
    assert!(!artifact.content.contains("from c"));

    let templates: Vec<_> = artifact.deps.templates().collect();
    assert_eq!(templates, vec![Path::new("/views/a.pug"), Path::new("/views/b.pug"), Path::new("/views/c.pug")]);
}

#[test]
fn test_intermediate_override_can_expose_new_block() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/c.pug", "body\n  block content");
    fs.insert("/views/b.pug", "extends c\nblock content\n  section\n    block inner\n      p b inner");
    fs.insert("/views/a.pug", "extends b\nblock inner\n  p a inner");

    let artifact = resolve(&fs, "/views/a.pug");
    assert_eq!(artifact.content, "body\n  section\n    p a inner");
}

#[test]
fn test_override_of_nested_block() {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/views/layout.pug",
        "main\n  block outer\n    section\n      block inner\n        p inner default\n    p outer tail",
    );
    fs.insert("/views/page.pug", "extends layout\nblock inner\n  p inner override");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "main\n  section\n    p inner override\n  p outer tail");
}

#[test]
fn test_append_and_prepend_ordering() {
    let layout = "html\n  head\n    block scripts\n      script(src='x.js')";
    let cases = [
        ("block append scripts", "html\n  head\n    script(src='x.js')\n    script(src='y.js')"),
        ("append scripts", "html\n  head\n    script(src='x.js')\n    script(src='y.js')"),
        ("block prepend scripts", "html\n  head\n    script(src='y.js')\n    script(src='x.js')"),
        ("prepend scripts", "html\n  head\n    script(src='y.js')\n    script(src='x.js')"),
    ];

    for (directive, expected) in cases {
        let fs = MemoryFileSystem::new();
        fs.insert("/views/layout.pug", layout);
        fs.insert("/views/page.pug", format!("extends layout\n{directive}\n  script(src='y.js')"));

        let artifact = resolve(&fs, "/views/page.pug");
        assert_eq!(artifact.content, expected, "directive `{directive}`");
    }
}

#[test]
fn test_unknown_override_has_no_effect() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "body\n  block content\n    p default");
    fs.insert("/views/page.pug", "extends layout\nblock sidebar\n  p ignored");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "body\n  p default");
}

#[test]
fn test_stray_lines_after_extends_are_ignored() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "body\n  block content");
    fs.insert("/views/page.pug", "extends layout\np stray\nblock content\n  p kept");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "body\n  p kept");
}

#[test]
fn test_lines_before_extends_are_dropped() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "body\n  block content");
    fs.insert("/views/page.pug", "p early\nextends layout\nblock content\n  p x");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "body\n  p x");
    assert_eq!(artifact.deps.len(), 2);
}

#[test]
fn test_only_first_root_extends_applies() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "body\n  block content");
    fs.insert("/views/page.pug", "extends layout\nextends missing\nblock content\n  p x");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "body\n  p x");
    assert!(!artifact.deps.contains(Path::new("/views/missing.pug")));
}

#[test]
fn test_indented_extends_is_plain_text() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "body\n  block content");
    fs.insert("/views/page.pug", "extends layout\nblock content\n  p x\n  extends missing");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "body\n  p x\n  extends missing");
    assert_eq!(artifact.deps.len(), 2);
}

#[test]
fn test_include_isolation() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "body\n  block content\n    p layout default");
    fs.insert("/views/widget-base.pug", "div.widget\n  block content\n    p widget default");
    fs.insert("/views/widget.pug", "extends widget-base\nblock content\n  p widget content");
    fs.insert("/views/page.pug", "extends layout\nblock content\n  include widget");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "body\n  div.widget\n    p widget content");

    let templates: Vec<_> = artifact.deps.templates().collect();
    assert_eq!(
        templates,
        vec![
            Path::new("/views/page.pug"),
            Path::new("/views/widget.pug"),
            Path::new("/views/widget-base.pug"),
            Path::new("/views/layout.pug")
        ]
    );
}

#[test]
fn test_root_level_include_is_expanded() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/page.pug", "include header\np body");
    fs.insert("/views/header.pug", "header\n  h1 Title");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "header\n  h1 Title\np body");
    assert!(artifact.deps.contains(Path::new("/views/header.pug")));
}

#[test]
fn test_include_inside_block_body() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "body\n  block content\n    include parts/hero\n    p after");
    fs.insert("/views/parts/hero.pug", "header\n  img(src='../img/hero.jpg')");

    let artifact = resolve(&fs, "/views/layout.pug");
    assert_eq!(artifact.content, "body\n  header\n    img(src=/views/img/hero.jpg)\n  p after");
    assert_eq!(
        artifact.deps.get(Path::new("/views/parts/hero.pug")),
        Some(&paths(&["/views/img/hero.jpg"])[..])
    );
}

#[test]
fn test_one_entry_per_template_even_when_included_twice() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/page.pug", "div\n  include part\n  include part");
    fs.insert("/views/part.pug", "img(src='p.png')");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "div\n  img(src=/views/p.png)\n  img(src=/views/p.png)");
    assert_eq!(artifact.deps.len(), 2);
    assert_eq!(artifact.all_dependencies(), paths(&["/views/p.png"]));
}

#[test]
fn test_dependencies_are_absolute_and_absolute_values_skipped() {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/proj/views/page.tmpl",
        "div\n  img(src='./a.png')\n  img(src=\"/static/logo.png\")\n  img(src='../shared/b.png')",
    );

    let artifact = resolve(&fs, "/proj/views/page.tmpl");
    assert!(artifact.content.contains("img(src=/proj/views/a.png)"));
    assert!(artifact.content.contains("img(src=\"/static/logo.png\")"));
    assert!(artifact.content.contains("img(src=/proj/shared/b.png)"));
    assert_eq!(
        artifact.deps.get(Path::new("/proj/views/page.tmpl")),
        Some(&paths(&["/proj/views/a.png", "/proj/shared/b.png"])[..])
    );
    for dep in artifact.all_dependencies() {
        assert!(dep.is_absolute());
        assert!(artifact.content.contains(dep.to_str().unwrap()));
    }
}

#[test]
fn test_configured_attribute_patterns() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/page.pug", "video(poster='p.jpg')\n  source(src='v.mp4')\nimg(src='i.png')");

    let config = ResolverConfig {
        attributes: vec!["video:poster".into(), ":src".into()],
        ..ResolverConfig::default()
    };
    let artifact = resolver_with(&fs, config).resolve(Path::new("/views/page.pug")).unwrap();
    assert_eq!(
        artifact.content,
        "video(poster=/views/p.jpg)\n  source(src=/views/v.mp4)\nimg(src=/views/i.png)"
    );
    assert_eq!(artifact.all_dependencies().len(), 3);
}

#[test]
fn test_mixed_indentation_styles_are_normalized() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "html\n\tbody\n\t\tblock content");
    fs.insert("/views/page.pug", "extends layout\nblock content\n    p four\n        span eight");

    let artifact = resolve(&fs, "/views/page.pug");
    assert_eq!(artifact.content, "html\n  body\n    p four\n      span eight");
}

#[test]
fn test_custom_indent_unit_and_separator() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "div\n  block content");
    fs.insert("/views/page.pug", "extends layout\r\nblock content\r\n  p x\r\n    span y");

    let config = ResolverConfig {
        indent_unit: 4,
        line_separator: "\r\n".into(),
        ..ResolverConfig::default()
    };
    let artifact = resolver_with(&fs, config).resolve(Path::new("/views/page.pug")).unwrap();
    assert_eq!(artifact.content, "div\r\n    p x\r\n        span y");
}

#[test]
fn test_extends_cycle_detected() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/a.pug", "extends b\nblock content\n  p a");
    fs.insert("/views/b.pug", "extends a\nblock content\n  p b");

    let err = resolver(&fs).resolve(Path::new("/views/a.pug")).unwrap_err();
    match err {
        PugdepError::CircularReference {
            chain,
        } => assert_eq!(chain, paths(&["/views/a.pug", "/views/b.pug", "/views/a.pug"])),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_include_cycle_detected() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/x.pug", "div\n  include x");

    let err = resolver(&fs).resolve(Path::new("/views/x.pug")).unwrap_err();
    assert!(matches!(
        err,
        PugdepError::CircularReference { ref chain } if chain.len() == 2
    ));
}

#[test]
fn test_missing_include_is_fatal() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/page.pug", "div\n  include missing");

    let err = resolver(&fs).resolve(Path::new("/views/page.pug")).unwrap_err();
    match err {
        PugdepError::FileNotFound {
            path,
        } => assert_eq!(path, PathBuf::from("/views/missing.pug")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_syntax_error_in_parent_is_fatal() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "html\n  body(class='x'\n  block content");
    fs.insert("/views/page.pug", "extends layout\nblock content\n  p x");

    let err = resolver(&fs).resolve(Path::new("/views/page.pug")).unwrap_err();
    match err {
        PugdepError::Syntax {
            path,
            line,
            ..
        } => {
            assert_eq!(path, PathBuf::from("/views/layout.pug"));
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_changed_template_is_reloaded() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "body\n  block content");
    fs.insert("/views/page.pug", "extends layout\nblock content\n  p one");

    let mut resolver = resolver(&fs);
    assert_eq!(resolver.resolve(Path::new("/views/page.pug")).unwrap().content, "body\n  p one");

    // Same mtime: cached record wins
    fs.write_keep_mtime("/views/page.pug", "extends layout\nblock content\n  p two");
    assert_eq!(resolver.resolve(Path::new("/views/page.pug")).unwrap().content, "body\n  p one");

    fs.touch("/views/page.pug", Duration::from_secs(2));
    assert_eq!(resolver.resolve(Path::new("/views/page.pug")).unwrap().content, "body\n  p two");
    assert_eq!(fs.reads("/views/layout.pug"), 1);
    assert_eq!(fs.reads("/views/page.pug"), 2);
}

#[test]
fn test_resolved_nodes_are_not_mutated_between_runs() {
    let fs = MemoryFileSystem::new();
    fs.insert("/views/layout.pug", "div\n  block a\n  section\n    block a");
    fs.insert("/views/page.pug", "extends layout\nblock a\n  p x");

    let mut resolver = resolver(&fs);
    let first = resolver.resolve(Path::new("/views/page.pug")).unwrap();
    let second = resolver.resolve(Path::new("/views/page.pug")).unwrap();
    assert_eq!(first.content, "div\n  p x\n  section\n    p x");
    assert_eq!(first, second);
}
