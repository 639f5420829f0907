#![no_main]

use faultline::{
    classify, definitions::builtin_repository, ComponentId, ErrorTypeLocator, Fault,
    ResolverConfig,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data).into_owned();
    let locator = ErrorTypeLocator::builtin(builtin_repository());
    let fault = Fault::severe(text.clone());
    let component = ComponentId::from(text);
    let resolution = classify(&fault, &component, None, &locator, &ResolverConfig::default());

    let mut buffer = String::new();
    resolution.log().write_to(&mut buffer).ok();

    assert!(buffer.len() < 2048);
});
