fn main() {
    // rstest's #[files] expands at compile time, so new fixtures need a rebuild
    println!("cargo:rerun-if-changed=tests/fixtures");
    println!("cargo:rerun-if-changed=tests/fixtures/invalid");
}
