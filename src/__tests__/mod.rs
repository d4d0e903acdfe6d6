mod grammar_test;
mod value_test;
