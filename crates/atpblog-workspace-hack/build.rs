// This is a stub build.rs.

fn main() {}
