fn main() {
    // ESP-IDF toolchain environment is only needed for the firmware binary;
    // host builds (tests, fuzzing) skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
