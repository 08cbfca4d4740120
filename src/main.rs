fn main() -> anyhow::Result<()> {
    log_provisioner::run()
}
