fn main() {
    quadcrop_lib::start();
}
