use std::panic;
use std::sync::OnceLock;

/// Install a global panic hook that routes panics through `tracing` with
/// file/line context before delegating to the previous hook. Safe to call
/// from multiple entry points; installation happens once per process.
pub fn install_tracing_panic_hook(service: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();

        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                .unwrap_or_else(|| "unknown".into());
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload not string".into());

            tracing::error!(
                service,
                %location,
                panic_message = %message,
                "panic captured"
            );

            previous(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_only_once() {
        install_tracing_panic_hook("ta-core-test");
        install_tracing_panic_hook("ta-core-test");
    }
}
