use crate::cart::store::CartLine;
use crate::error::{AppError, AppResult};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Persistence seam for the cart. Last write wins; there is no
/// cross-device sync or conflict resolution.
pub trait CartStorage {
    fn load(&self) -> AppResult<Vec<CartLine>>;
    fn save(&self, lines: &[CartLine]) -> AppResult<()>;
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn load(&self) -> AppResult<Vec<CartLine>> {
        (**self).load()
    }

    fn save(&self, lines: &[CartLine]) -> AppResult<()> {
        (**self).save(lines)
    }
}

/// JSON file on local disk, one cart per path.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartStorage for FileStorage {
    fn load(&self) -> AppResult<Vec<CartLine>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::InternalError(format!(
                "Failed to read cart file: {e}"
            ))),
        }
    }

    fn save(&self, lines: &[CartLine]) -> AppResult<()> {
        let raw = serde_json::to_string(lines)?;
        std::fs::write(&self.path, raw)
            .map_err(|e| AppError::InternalError(format!("Failed to write cart file: {e}")))
    }
}

/// In-memory adapter for tests.
#[derive(Default)]
pub struct MemoryStorage {
    lines: Mutex<Vec<CartLine>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> AppResult<Vec<CartLine>> {
        let guard = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, lines: &[CartLine]) -> AppResult<()> {
        let mut guard = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        *guard = lines.to_vec();
        Ok(())
    }
}
