fn main() {
    // Host builds (tests, simulation) never touch the ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
