// src/services/contract_storage.rs

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;

use crate::common::error::AppError;

pub const MAX_CONTRACT_BYTES: usize = 10 * 1024 * 1024;
const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Arquivos de contrato gravados em disco, dentro de `UPLOAD_DIR`.
#[derive(Debug, Clone)]
pub struct ContractStorage {
    base_dir: PathBuf,
}

impl ContractStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Só PDF/DOC/DOCX e no máximo 10 MiB.
    pub fn validate(file_name: &str, size: usize) -> Result<(), AppError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => {
                return Err(AppError::InvalidContractFile(
                    "Formato inválido. Apenas PDF, DOC e DOCX são aceitos.".into(),
                ))
            }
        }

        if size > MAX_CONTRACT_BYTES {
            return Err(AppError::InvalidContractFile("Arquivo muito grande. Máximo de 10MB.".into()));
        }
        Ok(())
    }

    /// Grava como `order_{display_id}_{timestamp}_{nome}` e devolve o caminho.
    pub async fn save(&self, display_id: i32, file_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        Self::validate(file_name, bytes.len())?;

        // Descarta qualquer diretório vindo do cliente ("../../x.pdf" -> "x.pdf")
        let base_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::InvalidContractFile("Nome de arquivo inválido.".into()))?;

        fs::create_dir_all(&self.base_dir).await?;

        let stored_name = format!("order_{}_{}_{}", display_id, Utc::now().timestamp_millis(), base_name);
        let path = self.base_dir.join(stored_name);
        fs::write(&path, bytes).await?;

        Ok(path.to_string_lossy().into_owned())
    }

    pub async fn read(&self, path: &str) -> Result<Vec<u8>, AppError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::ContractNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Arquivo já ausente não é erro.
    pub async fn remove(&self, path: &str) -> Result<(), AppError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
