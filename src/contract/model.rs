use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Annual adjustment index of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AdjustmentIndex {
    Ipca,
    Igpm,
    Inpc,
    Other(String),
}

impl AdjustmentIndex {
    /// Long label printed in the document.
    pub fn label(&self) -> String {
        match self {
            AdjustmentIndex::Ipca => {
                "IPCA (Índice Nacional de Preços ao Consumidor Amplo)".to_string()
            }
            AdjustmentIndex::Igpm => "IGP-M (Índice Geral de Preços do Mercado)".to_string(),
            AdjustmentIndex::Inpc => "INPC (Índice Nacional de Preços ao Consumidor)".to_string(),
            AdjustmentIndex::Other(name) if name.eq_ignore_ascii_case("outro") => {
                "Outro / Fixo".to_string()
            }
            AdjustmentIndex::Other(name) => format!("{name} (Outro Índice)"),
        }
    }
}

impl FromStr for AdjustmentIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "" => Err("índice de reajuste vazio".to_string()),
            "IPCA" => Ok(AdjustmentIndex::Ipca),
            "IGP-M" | "IGPM" => Ok(AdjustmentIndex::Igpm),
            "INPC" => Ok(AdjustmentIndex::Inpc),
            _ => Ok(AdjustmentIndex::Other(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for AdjustmentIndex {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for AdjustmentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentIndex::Ipca => f.write_str("IPCA"),
            AdjustmentIndex::Igpm => f.write_str("IGP-M"),
            AdjustmentIndex::Inpc => f.write_str("INPC"),
            AdjustmentIndex::Other(name) => f.write_str(name),
        }
    }
}

impl From<AdjustmentIndex> for String {
    fn from(index: AdjustmentIndex) -> Self {
        index.to_string()
    }
}

/// Service contract owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Contract {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Condomínio Edifício Azul")]
    pub nome: String,
    #[schema(example = "12.345.678/0001-90")]
    pub cnpj: String,
    #[schema(example = "Avenida Paulista, 1200")]
    pub endereco: String,
    #[schema(example = "01310-100")]
    pub cep: String,
    #[schema(example = "SP")]
    pub estado: String,
    #[schema(example = "(11) 99999-8888")]
    pub telefone: String,
    #[schema(example = "contato@condominio.com.br")]
    pub email: String,
    #[schema(value_type = String, example = "1234.50")]
    pub valor_contrato: Decimal,
    #[schema(example = "2025-01-01")]
    pub inicio_contrato: NaiveDate,
    pub termino_contrato: Option<NaiveDate>,
    #[schema(example = "Serviços de Automação Predial")]
    pub abrangencia_contrato: String,
    #[schema(value_type = Option<String>, example = "IPCA")]
    pub tipo_indice: Option<AdjustmentIndex>,
    pub clausulas_adicionais: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `contracts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContractRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nome: String,
    pub cnpj: String,
    pub endereco: String,
    pub cep: String,
    pub estado: String,
    pub telefone: String,
    pub email: String,
    pub valor_contrato: String,
    pub inicio_contrato: NaiveDate,
    pub termino_contrato: Option<NaiveDate>,
    pub abrangencia_contrato: String,
    pub tipo_indice: Option<String>,
    pub clausulas_adicionais: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContractRow> for Contract {
    type Error = rust_decimal::Error;

    fn try_from(row: ContractRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            nome: row.nome,
            cnpj: row.cnpj,
            endereco: row.endereco,
            cep: row.cep,
            estado: row.estado,
            telefone: row.telefone,
            email: row.email,
            valor_contrato: Decimal::from_str(&row.valor_contrato)?,
            inicio_contrato: row.inicio_contrato,
            termino_contrato: row.termino_contrato,
            abrangencia_contrato: row.abrangencia_contrato,
            tipo_indice: row
                .tipo_indice
                .as_deref()
                .and_then(|value| value.parse().ok()),
            clausulas_adicionais: row.clausulas_adicionais,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Validated field values for an insert or a full update.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractFields {
    pub nome: String,
    pub cnpj: String,
    pub endereco: String,
    pub cep: String,
    pub estado: String,
    pub telefone: String,
    pub email: String,
    pub valor_contrato: Decimal,
    pub inicio_contrato: NaiveDate,
    pub termino_contrato: Option<NaiveDate>,
    pub abrangencia_contrato: String,
    pub tipo_indice: Option<AdjustmentIndex>,
    pub clausulas_adicionais: Option<String>,
}

impl From<&Contract> for ContractFields {
    fn from(contract: &Contract) -> Self {
        Self {
            nome: contract.nome.clone(),
            cnpj: contract.cnpj.clone(),
            endereco: contract.endereco.clone(),
            cep: contract.cep.clone(),
            estado: contract.estado.clone(),
            telefone: contract.telefone.clone(),
            email: contract.email.clone(),
            valor_contrato: contract.valor_contrato,
            inicio_contrato: contract.inicio_contrato,
            termino_contrato: contract.termino_contrato,
            abrangencia_contrato: contract.abrangencia_contrato.clone(),
            tipo_indice: contract.tipo_indice.clone(),
            clausulas_adicionais: contract.clausulas_adicionais.clone(),
        }
    }
}

/// Create payload. Money and dates arrive as text the way users type them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateContractRequest {
    #[schema(example = "Condomínio Edifício Azul")]
    pub nome: String,
    #[schema(example = "12.345.678/0001-90")]
    pub cnpj: String,
    #[schema(example = "Avenida Paulista, 1200")]
    pub endereco: String,
    #[schema(example = "01310-100")]
    pub cep: String,
    #[schema(example = "SP")]
    pub estado: String,
    #[schema(example = "(11) 99999-8888")]
    pub telefone: String,
    #[schema(example = "contato@condominio.com.br")]
    pub email: String,
    #[schema(example = "R$ 1.234,50")]
    pub valor_contrato: String,
    #[schema(example = "2025-01-01")]
    pub inicio_contrato: String,
    #[schema(example = "2026-01-01")]
    pub termino_contrato: Option<String>,
    #[schema(example = "Serviços de Automação Predial")]
    pub abrangencia_contrato: String,
    #[schema(example = "IPCA")]
    pub tipo_indice: Option<String>,
    pub clausulas_adicionais: Option<String>,
}

/// Partial update; absent fields keep their stored value.
///
/// Optional columns are cleared by sending an empty string.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateContractRequest {
    pub nome: Option<String>,
    pub cnpj: Option<String>,
    pub endereco: Option<String>,
    pub cep: Option<String>,
    pub estado: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub valor_contrato: Option<String>,
    pub inicio_contrato: Option<String>,
    pub termino_contrato: Option<String>,
    pub abrangencia_contrato: Option<String>,
    pub tipo_indice: Option<String>,
    pub clausulas_adicionais: Option<String>,
}

pub const DEFAULT_PER_PAGE: u32 = 5;
pub const MAX_PER_PAGE: u32 = 100;

/// Query string of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive match on name, CNPJ or CEP
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SearchQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Trimmed search term, `None` when blank.
    pub fn term(&self) -> Option<&str> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContractPage {
    pub items: Vec<Contract>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

impl ContractPage {
    pub fn new(items: Vec<Contract>, page: u32, per_page: u32, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            ((total as u64 + per_page as u64 - 1) / per_page as u64) as u32
        };
        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}
