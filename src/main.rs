fn main() -> anyhow::Result<()> {
    deepfake_detective_lib::run()
}
