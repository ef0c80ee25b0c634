//! Import alias rewriting for copied component sources
//!
//! Registry sources import each other through the default aliases
//! (`@/components/ui/text`, `@/lib/utils`). When a project configures
//! different aliases the specifiers are rewritten on copy.

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// Rewrites module specifiers from default aliases to configured ones
#[derive(Debug)]
pub struct AliasRewriter {
    pattern: Regex,
    // (from, to), longest `from` first so `@/lib/utils` wins over `@/lib`
    replacements: Vec<(String, String)>,
}

impl AliasRewriter {
    /// Build a rewriter for every alias key whose configured value differs
    /// from the default one
    pub fn new(
        defaults: &BTreeMap<String, String>,
        configured: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let pattern = Regex::new(
            r#"(\bfrom\s+|\bimport\s*\(?\s*|\brequire\(\s*)(["'])([^"'\r\n]+)(["'])"#,
        )
        .context("Failed to compile import pattern")?;

        let mut replacements: Vec<(String, String)> = defaults
            .iter()
            .filter_map(|(key, from)| {
                configured
                    .get(key)
                    .filter(|to| *to != from)
                    .map(|to| (from.clone(), to.clone()))
            })
            .collect();
        replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(Self {
            pattern,
            replacements,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Rewrite all import specifiers in `source`
    pub fn rewrite(&self, source: &str) -> String {
        if self.is_noop() {
            return source.to_string();
        }

        self.pattern
            .replace_all(source, |caps: &Captures| {
                let specifier = &caps[3];
                let rewritten = self
                    .rewrite_specifier(specifier)
                    .unwrap_or_else(|| specifier.to_string());
                format!("{}{}{}{}", &caps[1], &caps[2], rewritten, &caps[4])
            })
            .into_owned()
    }

    fn rewrite_specifier(&self, specifier: &str) -> Option<String> {
        self.replacements.iter().find_map(|(from, to)| {
            let rest = specifier.strip_prefix(from.as_str())?;
            (rest.is_empty() || rest.starts_with('/')).then(|| format!("{to}{rest}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn aliases(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn defaults() -> BTreeMap<String, String> {
        aliases(&[
            ("ui", "@/components/ui"),
            ("lib", "@/lib"),
            ("utils", "@/lib/utils"),
        ])
    }

    #[test]
    fn test_identical_aliases_are_noop() {
        let rewriter = AliasRewriter::new(&defaults(), &defaults()).unwrap();
        assert!(rewriter.is_noop());

        let source = "import { cn } from '@/lib/utils';\n";
        assert_eq!(rewriter.rewrite(source), source);
    }

    #[test]
    fn test_rewrites_configured_aliases() {
        let configured = aliases(&[("ui", "~/ui"), ("utils", "~/utils")]);
        let rewriter = AliasRewriter::new(&defaults(), &configured).unwrap();

        let source = r#"import * as React from 'react';
import { TextClassContext } from '@/components/ui/text';
import { cn } from "@/lib/utils";
import { X } from '@/lib/icons/x';
"#;

        let expected = r#"import * as React from 'react';
import { TextClassContext } from '~/ui/text';
import { cn } from "~/utils";
import { X } from '@/lib/icons/x';
"#;

        assert_eq!(rewriter.rewrite(source), expected);
    }

    #[test]
    fn test_longest_alias_wins() {
        let configured = aliases(&[("lib", "#lib"), ("utils", "#utils")]);
        let rewriter = AliasRewriter::new(&defaults(), &configured).unwrap();

        assert_eq!(
            rewriter.rewrite("import { cn } from '@/lib/utils';"),
            "import { cn } from '#utils';"
        );
        assert_eq!(
            rewriter.rewrite("import { X } from '@/lib/icons/x';"),
            "import { X } from '#lib/icons/x';"
        );
    }

    #[test]
    fn test_partial_segment_not_rewritten() {
        let configured = aliases(&[("lib", "#lib")]);
        let rewriter = AliasRewriter::new(&defaults(), &configured).unwrap();

        assert_eq!(
            rewriter.rewrite("import x from '@/library';"),
            "import x from '@/library';"
        );
    }

    #[test]
    fn test_side_effect_and_dynamic_imports() {
        let configured = aliases(&[("ui", "~/ui")]);
        let rewriter = AliasRewriter::new(&defaults(), &configured).unwrap();

        assert_eq!(
            rewriter.rewrite("import '@/components/ui/global.css';\nconst d = import('@/components/ui/dialog');"),
            "import '~/ui/global.css';\nconst d = import('~/ui/dialog');"
        );
    }

    #[test]
    fn test_string_literals_outside_imports_untouched() {
        let configured = aliases(&[("utils", "~/utils")]);
        let rewriter = AliasRewriter::new(&defaults(), &configured).unwrap();

        let source = "const path = '@/lib/utils';";
        assert_eq!(rewriter.rewrite(source), source);
    }
}
