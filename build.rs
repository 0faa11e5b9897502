fn main() {
    // RDKit usually comes from a conda environment; point the embedded
    // interpreter at its shared libraries when one is active.
    println!("cargo:rerun-if-env-changed=CONDA_PREFIX");
    if let Ok(prefix) = std::env::var("CONDA_PREFIX") {
        println!("cargo:rustc-env=LD_LIBRARY_PATH={prefix}/lib");
    }
}
