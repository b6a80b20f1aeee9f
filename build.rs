fn main() {
    // Node addon link flags are only needed for the binding build.
    if std::env::var_os("CARGO_FEATURE_NAPI").is_some() {
        napi_build::setup();
    }
}
