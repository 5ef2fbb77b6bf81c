mod test_geometry;
mod test_hermitian;

pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
