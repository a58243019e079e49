fn main() {
    // The bundled default configuration is embedded with include_dir!
    println!("cargo:rerun-if-changed=resources/");
}
