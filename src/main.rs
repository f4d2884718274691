fn main() {
    kisexp::cli::run();
}
