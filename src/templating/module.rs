//! CommonJS module emission for bundler integration.
//!
//! A bundler loader hands the resolved artifact to [`emit_module`] and returns
//! the generated script. The script `require`s every asset, then replaces each
//! absolute asset path in the content with the quoted value the bundler
//! returned for it (usually the public URL), and exports the resulting string.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use super::artifact::ResolvedArtifact;
use crate::utils::fs::normalize_path_for_storage;

/// Name of the object holding `require` results in generated code
pub const REQUIRE_OBJECT: &str = "requirePaths";

/// Generate a CommonJS module exporting the artifact's content.
///
/// Longer paths are replaced first so a path that is a prefix of another
/// never clobbers it. A failing `require` rethrows with the name of the
/// template that referenced the asset.
#[must_use]
pub fn emit_module(artifact: &ResolvedArtifact) -> String {
    let mut requires: Vec<(&Path, &Path)> = Vec::new();
    let mut seen = HashSet::new();
    for (template, deps) in artifact.deps.iter() {
        for dep in deps {
            if seen.insert(dep.as_path()) {
                requires.push((template, dep.as_path()));
            }
        }
    }
    requires.sort_by_key(|(_, dep)| std::cmp::Reverse(dep.as_os_str().len()));

    let mut script = format!("var {REQUIRE_OBJECT} = {{}};\n");
    for (template, dep) in requires {
        let key = js_string(&dep.to_string_lossy());
        let specifier = js_string(&normalize_path_for_storage(dep));
        let message = js_string(&format!("Error in {}:\n", template.display()));
        let _ = write!(
            script,
            "try {{\n  {REQUIRE_OBJECT}[{key}] = require({specifier});\n}} catch (error) {{\n  throw new Error({message} + error.message);\n}}\n"
        );
    }

    let _ = write!(
        script,
        "var tpl = {content};\n\
         for (var originPath in {REQUIRE_OBJECT}) {{\n\
         \x20 if (Object.prototype.hasOwnProperty.call({REQUIRE_OBJECT}, originPath)) {{\n\
         \x20   var rp = {REQUIRE_OBJECT}[originPath];\n\
         \x20   tpl = tpl.split(originPath).join('\"' + rp + '\"');\n\
         \x20 }}\n\
         }}\n\
         module.exports = tpl;\n",
        content = js_string(&artifact.content),
    );
    script
}

/// A JavaScript string literal for `value`
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
