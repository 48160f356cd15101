mod expr;
mod parse;
