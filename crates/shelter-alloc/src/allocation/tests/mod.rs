mod common;
mod manual;
