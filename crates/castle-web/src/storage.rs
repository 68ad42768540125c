use castle_core::error::AdapterError;
use castle_core::location::STORAGE_KEY;
use castle_core::LocationStore;
use web_sys as web;

/// `localStorage` backed location record. Without storage (private mode,
/// sandboxed frames) reads are empty and writes fail softly.
pub struct LocalStore {
    storage: Option<web::Storage>,
}

impl LocalStore {
    pub fn open() -> Self {
        let storage = web::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable; location will not persist");
        }
        Self { storage }
    }
}

fn storage_error(e: wasm_bindgen::JsValue) -> AdapterError {
    AdapterError::Storage(format!("{e:?}"))
}

impl LocationStore for LocalStore {
    fn read(&self) -> Result<Option<String>, AdapterError> {
        match &self.storage {
            Some(s) => s.get_item(STORAGE_KEY).map_err(storage_error),
            None => Ok(None),
        }
    }

    fn write(&mut self, value: &str) -> Result<(), AdapterError> {
        match &self.storage {
            Some(s) => s.set_item(STORAGE_KEY, value).map_err(storage_error),
            None => Err(AdapterError::Storage("localStorage unavailable".into())),
        }
    }

    fn remove(&mut self) -> Result<(), AdapterError> {
        match &self.storage {
            Some(s) => s.remove_item(STORAGE_KEY).map_err(storage_error),
            None => Ok(()),
        }
    }
}
