#![no_main]

use faultline::{
    definitions::builtin_repository, resolve_with, Error, ErrorTypeLocator, Event, EventErrors,
    Fault, FaultKind, MessagingFault, ResolverConfig,
};
use libfuzzer_sys::fuzz_target;

fn kind_for(byte: u8) -> FaultKind {
    match byte % 6 {
        0 => FaultKind::FatalSignal,
        1 | 2 => FaultKind::GenericSevere,
        3 => FaultKind::CONNECTIVITY,
        4 => FaultKind::PLAIN,
        _ => FaultKind::domain(format!("Fuzz{byte}Fault")),
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&header, body)) = data.split_first() else {
        return;
    };

    let faults = body.iter().map(|&byte| {
        let fault = Fault::new(kind_for(byte));
        if byte & 0x80 != 0 {
            fault.with_message(format!("m{byte}"))
        } else {
            fault
        }
    });
    let Some(fault) = Fault::from_chain(faults) else {
        return;
    };

    let repo = builtin_repository();
    let locator = ErrorTypeLocator::builtin(repo);
    let mut event = Event::new("fuzz");
    if header & 1 != 0 {
        event.set_error(Error::of_type(repo.transformation().clone()));
    }
    let config = ResolverConfig::default().with_max_chain_depth(usize::from(header >> 1));

    let resolved = resolve_with(
        MessagingFault::new("base", fault, event, "fuzz:component"),
        &locator,
        &config,
    );

    assert!(resolved.event().error().is_some());
    assert!(!resolved.message().is_empty());
});
