fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/gobgp.proto");

    let descriptors = protox::compile(["proto/gobgp.proto"], ["proto/"])?;
    tonic_build::configure()
        .build_server(false) // We only need the client
        .compile_fds(descriptors)?;
    Ok(())
}
