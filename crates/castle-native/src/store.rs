use castle_core::error::AdapterError;
use castle_core::LocationStore;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Location record persisted as a small JSON file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn storage_error(e: std::io::Error) -> AdapterError {
    AdapterError::Storage(e.to_string())
}

impl LocationStore for FileStore {
    fn read(&self) -> Result<Option<String>, AdapterError> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }

    fn write(&mut self, value: &str) -> Result<(), AdapterError> {
        std::fs::write(&self.path, value).map_err(storage_error)
    }

    fn remove(&mut self) -> Result<(), AdapterError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(storage_error(e)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castle_core::location::GeoTicket;
    use castle_core::LocationController;
    use std::time::Duration;

    fn resolve(ctl: &mut LocationController<FileStore>, name: &str) -> GeoTicket {
        let ticket = ctl.begin_geolocation(Duration::ZERO).unwrap();
        ctl.fix_acquired(ticket, 43.06417, 141.34694).unwrap();
        ctl.name_resolved(ticket, Ok(name.to_string()));
        ticket
    }

    #[test]
    fn resolved_location_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loc.json");
        let mut ctl = LocationController::new(FileStore::new(&path));
        resolve(&mut ctl, "Sapporo");
        assert!(path.exists());

        let again = LocationController::new(FileStore::new(&path));
        assert_eq!(again.current().name, "Sapporo");
        assert!((again.current().lat - 43.0642).abs() < 1e-9);
    }

    #[test]
    fn selecting_default_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loc.json");
        let mut ctl = LocationController::new(FileStore::new(&path));
        resolve(&mut ctl, "Sapporo");
        ctl.select_default();
        assert!(!path.exists());
        assert!(ctl.current().is_default());
        // removing twice is fine
        assert!(FileStore::new(&path).remove().is_ok());
    }

    #[test]
    fn garbage_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loc.json");
        std::fs::write(&path, "not json").unwrap();
        let ctl = LocationController::new(FileStore::new(&path));
        assert!(ctl.current().is_default());
    }
}
