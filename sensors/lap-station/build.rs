fn main() {
    // Provide app_main stub and ESP-IDF link args
    embuild::espidf::sysenv::output();
}
