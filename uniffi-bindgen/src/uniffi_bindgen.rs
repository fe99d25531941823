//! Generates Swift and Kotlin bindings for `secure-storage-core`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
