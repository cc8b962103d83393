fn main() {
    // shadow-rs generates extended build metadata (git hash, timestamps, rustc version)
    // surfaced by `tagver --version --verbose`.
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("shadow-rs build failed");
}
