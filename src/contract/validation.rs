//! Input validation for contract payloads.
//!
//! Every field is checked and all problems are reported at once, each with a
//! Portuguese message and a hint on how to fix it.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

use super::model::{AdjustmentIndex, Contract, ContractFields, CreateContractRequest, UpdateContractRequest};
use crate::document::common::{parse_currency, parse_date};

lazy_static! {
    static ref CNPJ_RE: Regex = Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").unwrap();
    static ref CEP_RE: Regex = Regex::new(r"^\d{5}-\d{3}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\(\d{2}\)\s\d{4,5}-\d{4}$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref UF_RE: Regex = Regex::new(r"^[A-Za-z]{2}$").unwrap();
}

const MAX_NOME: usize = 100;
const MAX_ENDERECO: usize = 200;
const MAX_EMAIL: usize = 100;
const MAX_ABRANGENCIA: usize = 100;
const MAX_TIPO_INDICE: usize = 10;

/// Validation error with a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} não pode ficar em branco", label)).with_suggestion(format!(
            "Preencha o campo {} com um valor válido",
            label.to_lowercase()
        ))
    }

    pub fn too_long(field: &str, label: &str, max: usize) -> Self {
        Self::new(field, format!("{} deve ter no máximo {} caracteres", label, max))
            .with_suggestion(format!("Abrevie o campo {}", label.to_lowercase()))
    }

    pub fn invalid_cnpj(field: &str) -> Self {
        Self::new(field, "CNPJ em formato inválido")
            .with_suggestion("Use o formato 00.000.000/0000-00")
    }

    pub fn invalid_cep(field: &str) -> Self {
        Self::new(field, "CEP em formato inválido").with_suggestion("Use o formato 00000-000")
    }

    pub fn invalid_phone(field: &str) -> Self {
        Self::new(field, "Telefone em formato inválido")
            .with_suggestion("Use o formato (00) 0000-0000 ou (00) 00000-0000")
    }

    pub fn invalid_email(field: &str) -> Self {
        Self::new(field, "Email inválido").with_suggestion("Exemplo: contato@empresa.com.br")
    }

    pub fn invalid_uf(field: &str) -> Self {
        Self::new(field, "Estado deve ter 2 letras").with_suggestion("Exemplo: SP")
    }

    pub fn invalid_currency(field: &str, value: &str) -> Self {
        Self::new(field, format!("Valor '{}' inválido", value))
            .with_suggestion("Use um valor positivo, exemplo: R$ 1.234,56")
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(field, format!("Data '{}' inválida", value))
            .with_suggestion("Use o formato AAAA-MM-DD ou DD/MM/AAAA")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// All errors on one line, for the `message` of an error response.
    pub fn to_message(&self) -> String {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        format!(
            "Validação falhou ({} erro(s)): {}",
            self.errors.len(),
            parts.join("; ")
        )
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

// ============================================================================
// Field validators
// ============================================================================

/// Trimmed value, or an error when blank.
pub fn validate_required(
    value: &str,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
    trimmed.to_string()
}

/// Flags `value` when it has more than `max` characters, unless the field
/// already has an error.
pub fn validate_max_len(
    value: &str,
    field: &str,
    label: &str,
    max: usize,
    errors: &mut ValidationErrors,
) {
    if !errors.has_field(field) && value.chars().count() > max {
        errors.add(ValidationError::too_long(field, label, max));
    }
}

fn validate_pattern(
    value: &str,
    field: &str,
    label: &str,
    pattern: &Regex,
    invalid: fn(&str) -> ValidationError,
    errors: &mut ValidationErrors,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    } else if !pattern.is_match(trimmed) {
        errors.add(invalid(field));
    }
    trimmed.to_string()
}

pub fn validate_cnpj(value: &str, errors: &mut ValidationErrors) -> String {
    validate_pattern(value, "cnpj", "CNPJ", &CNPJ_RE, ValidationError::invalid_cnpj, errors)
}

pub fn validate_cep(value: &str, errors: &mut ValidationErrors) -> String {
    validate_pattern(value, "cep", "CEP", &CEP_RE, ValidationError::invalid_cep, errors)
}

pub fn validate_phone(value: &str, errors: &mut ValidationErrors) -> String {
    validate_pattern(value, "telefone", "Telefone", &PHONE_RE, ValidationError::invalid_phone, errors)
}

pub fn validate_email(value: &str, errors: &mut ValidationErrors) -> String {
    validate_pattern(value, "email", "Email", &EMAIL_RE, ValidationError::invalid_email, errors)
}

/// State code, upper-cased.
pub fn validate_uf(value: &str, errors: &mut ValidationErrors) -> String {
    validate_pattern(value, "estado", "Estado", &UF_RE, ValidationError::invalid_uf, errors)
        .to_ascii_uppercase()
}

pub fn validate_currency(value: &str, errors: &mut ValidationErrors) -> Decimal {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field("valor_contrato", "Valor do Contrato"));
        return Decimal::ZERO;
    }
    match parse_currency(trimmed) {
        // At most two decimals, so the stored text re-parses unchanged
        Some(amount) if !amount.is_sign_negative() => {
            amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        }
        _ => {
            errors.add(ValidationError::invalid_currency("valor_contrato", trimmed));
            Decimal::ZERO
        }
    }
}

pub fn validate_date(
    value: &str,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field, label));
        return None;
    }
    let parsed = parse_date(trimmed);
    if parsed.is_none() {
        errors.add(ValidationError::invalid_date(field, trimmed));
    }
    parsed
}

/// Blank means "no end date".
pub fn validate_optional_date(
    value: Option<&str>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
    let parsed = parse_date(trimmed);
    if parsed.is_none() {
        errors.add(ValidationError::invalid_date(field, trimmed));
    }
    parsed
}

/// Blank means "not informed".
pub fn parse_index(value: Option<&str>) -> Option<AdjustmentIndex> {
    value.and_then(|v| v.parse().ok())
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Payload validation
// ============================================================================

impl CreateContractRequest {
    /// Validate all fields and build the values to store.
    pub fn validate(&self) -> Result<ContractFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let nome = validate_required(&self.nome, "nome", "Nome", &mut errors);
        validate_max_len(&nome, "nome", "Nome", MAX_NOME, &mut errors);
        let cnpj = validate_cnpj(&self.cnpj, &mut errors);
        let endereco = validate_required(&self.endereco, "endereco", "Endereço", &mut errors);
        validate_max_len(&endereco, "endereco", "Endereço", MAX_ENDERECO, &mut errors);
        let cep = validate_cep(&self.cep, &mut errors);
        let estado = validate_uf(&self.estado, &mut errors);
        let telefone = validate_phone(&self.telefone, &mut errors);
        let email = validate_email(&self.email, &mut errors);
        validate_max_len(&email, "email", "Email", MAX_EMAIL, &mut errors);
        let valor_contrato = validate_currency(&self.valor_contrato, &mut errors);
        let inicio_contrato = validate_date(
            &self.inicio_contrato,
            "inicio_contrato",
            "Início do Contrato",
            &mut errors,
        );
        let termino_contrato = validate_optional_date(
            self.termino_contrato.as_deref(),
            "termino_contrato",
            &mut errors,
        );
        let abrangencia_contrato = validate_required(
            &self.abrangencia_contrato,
            "abrangencia_contrato",
            "Abrangência",
            &mut errors,
        );
        validate_max_len(
            &abrangencia_contrato,
            "abrangencia_contrato",
            "Abrangência",
            MAX_ABRANGENCIA,
            &mut errors,
        );
        let tipo_indice = optional_text(self.tipo_indice.as_deref());
        if let Some(ref tipo_indice) = tipo_indice {
            validate_max_len(
                tipo_indice,
                "tipo_indice",
                "Tipo de Índice de Reajuste",
                MAX_TIPO_INDICE,
                &mut errors,
            );
        }

        match inicio_contrato {
            Some(inicio_contrato) if errors.is_empty() => Ok(ContractFields {
                nome,
                cnpj,
                endereco,
                cep,
                estado,
                telefone,
                email,
                valor_contrato,
                inicio_contrato,
                termino_contrato,
                abrangencia_contrato,
                tipo_indice: parse_index(tipo_indice.as_deref()),
                clausulas_adicionais: optional_text(self.clausulas_adicionais.as_deref()),
            }),
            _ => Err(errors),
        }
    }
}

impl UpdateContractRequest {
    /// Merge the provided fields over `current` and validate the result.
    pub fn apply(&self, current: &Contract) -> Result<ContractFields, ValidationErrors> {
        let merged = CreateContractRequest {
            nome: self.nome.clone().unwrap_or_else(|| current.nome.clone()),
            cnpj: self.cnpj.clone().unwrap_or_else(|| current.cnpj.clone()),
            endereco: self.endereco.clone().unwrap_or_else(|| current.endereco.clone()),
            cep: self.cep.clone().unwrap_or_else(|| current.cep.clone()),
            estado: self.estado.clone().unwrap_or_else(|| current.estado.clone()),
            telefone: self.telefone.clone().unwrap_or_else(|| current.telefone.clone()),
            email: self.email.clone().unwrap_or_else(|| current.email.clone()),
            valor_contrato: self
                .valor_contrato
                .clone()
                .unwrap_or_else(|| current.valor_contrato.to_string()),
            inicio_contrato: self
                .inicio_contrato
                .clone()
                .unwrap_or_else(|| current.inicio_contrato.format("%Y-%m-%d").to_string()),
            termino_contrato: match &self.termino_contrato {
                Some(value) => Some(value.clone()),
                None => current
                    .termino_contrato
                    .map(|date| date.format("%Y-%m-%d").to_string()),
            },
            abrangencia_contrato: self
                .abrangencia_contrato
                .clone()
                .unwrap_or_else(|| current.abrangencia_contrato.clone()),
            tipo_indice: match &self.tipo_indice {
                Some(value) => Some(value.clone()),
                None => current.tipo_indice.as_ref().map(ToString::to_string),
            },
            clausulas_adicionais: self
                .clausulas_adicionais
                .clone()
                .or_else(|| current.clausulas_adicionais.clone()),
        };
        merged.validate()
    }
}
