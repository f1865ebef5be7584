//! Contract database operations.
//!
//! Every query filters on the owning user, so a contract belonging to
//! someone else behaves exactly like a missing one.

use chrono::Utc;
use uuid::Uuid;

use super::AppState;
use crate::contract::model::{Contract, ContractFields, ContractRow};

const CONTRACT_COLUMNS: &str = "id, user_id, nome, cnpj, endereco, cep, estado, telefone, email, \
     valor_contrato, inicio_contrato, termino_contrato, abrangencia_contrato, tipo_indice, \
     clausulas_adicionais, created_at, updated_at";

const SEARCH_FILTER: &str =
    "(nome LIKE ? ESCAPE '\\' OR cnpj LIKE ? ESCAPE '\\' OR cep LIKE ? ESCAPE '\\')";

fn into_contract(row: ContractRow) -> Result<Contract, sqlx::Error> {
    Contract::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl AppState {
    pub async fn get_contract(
        &self,
        user_id: &Uuid,
        contract_id: &Uuid,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = ? AND user_id = ?"
        ))
        .bind(contract_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_contract).transpose()
    }

    /// Whether the user already has a contract with this CNPJ, optionally
    /// ignoring one contract (the one being edited).
    pub async fn cnpj_in_use(
        &self,
        user_id: &Uuid,
        cnpj: &str,
        except: Option<&Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contracts WHERE user_id = ? AND cnpj = ? AND (? IS NULL OR id <> ?)",
        )
        .bind(user_id)
        .bind(cnpj)
        .bind(except)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn create_contract(
        &self,
        user_id: &Uuid,
        fields: &ContractFields,
    ) -> Result<Contract, sqlx::Error> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            "INSERT INTO contracts ({CONTRACT_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {CONTRACT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&fields.nome)
        .bind(&fields.cnpj)
        .bind(&fields.endereco)
        .bind(&fields.cep)
        .bind(&fields.estado)
        .bind(&fields.telefone)
        .bind(&fields.email)
        .bind(fields.valor_contrato.to_string())
        .bind(fields.inicio_contrato)
        .bind(fields.termino_contrato)
        .bind(&fields.abrangencia_contrato)
        .bind(fields.tipo_indice.as_ref().map(ToString::to_string))
        .bind(&fields.clausulas_adicionais)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        into_contract(row)
    }

    /// Replace every editable field. `None` when the contract is not the
    /// user's.
    pub async fn update_contract(
        &self,
        user_id: &Uuid,
        contract_id: &Uuid,
        fields: &ContractFields,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            "UPDATE contracts SET nome = ?, cnpj = ?, endereco = ?, cep = ?, estado = ?, \
             telefone = ?, email = ?, valor_contrato = ?, inicio_contrato = ?, \
             termino_contrato = ?, abrangencia_contrato = ?, tipo_indice = ?, \
             clausulas_adicionais = ?, updated_at = ? \
             WHERE id = ? AND user_id = ? RETURNING {CONTRACT_COLUMNS}"
        ))
        .bind(&fields.nome)
        .bind(&fields.cnpj)
        .bind(&fields.endereco)
        .bind(&fields.cep)
        .bind(&fields.estado)
        .bind(&fields.telefone)
        .bind(&fields.email)
        .bind(fields.valor_contrato.to_string())
        .bind(fields.inicio_contrato)
        .bind(fields.termino_contrato)
        .bind(&fields.abrangencia_contrato)
        .bind(fields.tipo_indice.as_ref().map(ToString::to_string))
        .bind(&fields.clausulas_adicionais)
        .bind(Utc::now())
        .bind(contract_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_contract).transpose()
    }

    pub async fn delete_contract(
        &self,
        user_id: &Uuid,
        contract_id: &Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = ? AND user_id = ?")
            .bind(contract_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of the user's contracts, newest first, plus the total count.
    ///
    /// `term` matches name, CNPJ or CEP as a case-insensitive substring.
    pub async fn search_contracts(
        &self,
        user_id: &Uuid,
        term: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Contract>, i64), sqlx::Error> {
        let filter = if term.is_some() {
            format!("user_id = ? AND {SEARCH_FILTER}")
        } else {
            "user_id = ?".to_string()
        };
        let pattern = term.map(like_pattern);
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);

        let count_sql = format!("SELECT COUNT(*) FROM contracts WHERE {filter}");
        // rowid follows insertion order, so it doubles as "newest first"
        let rows_sql = format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE {filter} \
             ORDER BY rowid DESC LIMIT ? OFFSET ?"
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        let mut rows_query = sqlx::query_as::<_, ContractRow>(&rows_sql).bind(user_id);

        if let Some(pattern) = &pattern {
            for _ in 0..3 {
                count_query = count_query.bind(pattern.clone());
                rows_query = rows_query.bind(pattern.clone());
            }
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let rows = rows_query
            .bind(i64::from(per_page))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let contracts = rows
            .into_iter()
            .map(into_contract)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((contracts, total))
    }
}
