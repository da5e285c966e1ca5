use super::*;

mod html_parsing;
mod selector_engine_and_dom_tree;
