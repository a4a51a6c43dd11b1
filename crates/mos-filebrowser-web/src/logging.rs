//! Tracing output to the browser console.

use std::io::{self, Write};

use tracing_subscriber::EnvFilter;
use wasm_bindgen::JsValue;

/// Global the page may set to a tracing filter, e.g. `"mos_filebrowser_core=debug"`.
pub const LOG_FILTER_GLOBAL: &str = "__MOS_FILEBROWSER_LOG__";

/// Buffers one formatted event and logs it to the console when dropped.
#[derive(Default)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&JsValue::from_str(line));
        }
    }
}

/// Install the console subscriber. Later calls are no-ops.
pub fn init(window: &web_sys::Window) {
    let filter = js_sys::Reflect::get(window, &LOG_FILTER_GLOBAL.into())
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_else(|| "info".to_string());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(ConsoleWriter::default)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init();
}
