use tree_sitter::Language;

/// Grammar used for a given file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    TypeScript,
    Tsx,
    JavaScript,
}

impl Grammar {
    /// Pick the grammar for a file extension (without the leading dot).
    ///
    /// - `.ts`/`.mts`/`.cts` -> TypeScript grammar
    /// - `.tsx` -> TSX grammar
    /// - `.js`/`.jsx`/`.mjs`/`.cjs` -> JavaScript grammar (it accepts JSX)
    ///
    /// The TypeScript and TSX grammars must stay separate: TSX rejects
    /// angle-bracket type assertions (`<T>expr`). Any other extension that was
    /// configured as source-like is parsed with TSX, the most permissive one.
    pub fn for_extension(ext: &str) -> Self {
        match ext {
            "ts" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            _ => Self::Tsx,
        }
    }

    /// `true` for grammars that carry type annotations.
    pub fn is_typed(self) -> bool {
        matches!(self, Self::TypeScript | Self::Tsx)
    }

    pub fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_selection() {
        assert_eq!(Grammar::for_extension("ts"), Grammar::TypeScript);
        assert_eq!(Grammar::for_extension("tsx"), Grammar::Tsx);
        assert_eq!(Grammar::for_extension("mjs"), Grammar::JavaScript);
        assert_eq!(Grammar::for_extension("jsx"), Grammar::JavaScript);
        assert_eq!(Grammar::for_extension("vue"), Grammar::Tsx);
        assert!(Grammar::Tsx.is_typed());
        assert!(!Grammar::JavaScript.is_typed());
    }
}
