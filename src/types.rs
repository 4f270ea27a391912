/// A symbol of the alphabet `1..=n`. Zero is never a valid symbol.
pub type Symbol = usize;

/// An index into a sequence, where position 0 holds the leading symbol and the blocks start at 1.
pub type Position = usize;

/// An ordered pair of consecutive symbols.
pub type SymbolPair = (Symbol, Symbol);
