//! Flag types carried by nodes and tokens.

bitflags::bitflags! {
    /// Flags for AST nodes.
    ///
    /// `LET` and `CONST` sit on a `VariableDeclarationList` and decide which
    /// declaration kind its bindings get; a list with neither is `var`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u32 {
        const NONE                 = 0;
        const LET                  = 1 << 0;
        const CONST                = 1 << 1;
        /// An object literal member written as `m() {}`.
        const METHOD               = 1 << 2;
        /// A script whose first statement is the `"use strict"` directive.
        const STRICT_MODE          = 1 << 3;
        /// The node was synthesized by the parser during recovery.
        const MISSING              = 1 << 4;

        const BLOCK_SCOPED = Self::LET.bits() | Self::CONST.bits();
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u16 {
        const NONE                              = 0;
        const PRECEDING_LINE_BREAK              = 1 << 0;
        const UNTERMINATED                      = 1 << 1;
        const SCIENTIFIC                        = 1 << 2;
        const HEX_SPECIFIER                     = 1 << 3;
        const BINARY_SPECIFIER                  = 1 << 4;
        const OCTAL_SPECIFIER                   = 1 << 5;
        const CONTAINS_SEPARATOR                = 1 << 6;
        const CONTAINS_INVALID_ESCAPE           = 1 << 7;
        const SINGLE_QUOTE                      = 1 << 8;

        const NUMERIC_BASE = Self::HEX_SPECIFIER.bits() | Self::BINARY_SPECIFIER.bits() | Self::OCTAL_SPECIFIER.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_scoped_covers_let_and_const() {
        assert!(NodeFlags::BLOCK_SCOPED.contains(NodeFlags::LET));
        assert!(NodeFlags::BLOCK_SCOPED.contains(NodeFlags::CONST));
        assert!(!NodeFlags::NONE.intersects(NodeFlags::BLOCK_SCOPED));
    }
}
