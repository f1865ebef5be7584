//! Clause templates interpolated with contract fields.

use serde::Serialize;
use utoipa::ToSchema;

use super::common::{format_currency, format_date};
use super::style::{COMPANY_CNPJ, COMPANY_NAME, END_DATE_UNDEFINED, INDEX_NOT_INFORMED};
use crate::contract::model::Contract;

const NOTICE_DAYS: &str = "30 (trinta)";

/// One numbered clause: a bold heading followed by body paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Clause {
    #[schema(example = "CLÁUSULA PRIMEIRA: DAS PARTES CONTRATANTES")]
    pub title: String,
    pub paragraphs: Vec<String>,
}

impl Clause {
    fn new(title: &str, paragraphs: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            paragraphs,
        }
    }
}

/// End date as printed; open-ended contracts read "Não definido".
pub fn end_date_text(contract: &Contract) -> String {
    match contract.termino_contrato {
        Some(date) => format_date(Some(date.into()), true),
        None => END_DATE_UNDEFINED.to_string(),
    }
}

pub fn index_text(contract: &Contract) -> String {
    contract
        .tipo_indice
        .as_ref()
        .map(|index| index.label())
        .unwrap_or_else(|| INDEX_NOT_INFORMED.to_string())
}

/// Non-empty lines of the supplementary clause text.
pub fn additional_paragraphs(contract: &Contract) -> Vec<String> {
    contract
        .clausulas_adicionais
        .as_deref()
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the clause list of a contract.
///
/// The supplementary clause comes last and is present only when its text
/// has at least one non-blank line.
pub fn contract_clauses(contract: &Contract) -> Vec<Clause> {
    let mut clauses = vec![
        Clause::new(
            "CLÁUSULA PRIMEIRA: DAS PARTES CONTRATANTES",
            vec![
                format!(
                    "CONTRATANTE: {}, inscrito sob o CNPJ {}, com sede em {}, CEP {}, {}. \
                     Contato principal: Tel. {}, E-mail: {}.",
                    contract.nome,
                    contract.cnpj,
                    contract.endereco,
                    contract.cep,
                    contract.estado,
                    contract.telefone,
                    contract.email,
                ),
                format!("CONTRATADA: {COMPANY_NAME}, inscrita sob o CNPJ {COMPANY_CNPJ}."),
            ],
        ),
        Clause::new(
            "CLÁUSULA SEGUNDA: DO OBJETO E VALOR",
            vec![
                format!(
                    "2.1. O objeto deste contrato é a prestação de serviços na abrangência de {}.",
                    contract.abrangencia_contrato
                ),
                format!(
                    "2.2. O valor total acordado para o contrato é de {} (reais).",
                    format_currency(contract.valor_contrato)
                ),
            ],
        ),
        Clause::new(
            "CLÁUSULA TERCEIRA: DA DURAÇÃO E REAJUSTE",
            vec![
                format!(
                    "3.1. Este contrato tem início em {} e término previsto para {}.",
                    format_date(Some(contract.inicio_contrato.into()), true),
                    end_date_text(contract)
                ),
                format!(
                    "3.2. O índice de reajuste anual a ser aplicado é o {}.",
                    index_text(contract)
                ),
            ],
        ),
        Clause::new(
            "CLÁUSULA QUARTA: DAS OBRIGAÇÕES DAS PARTES",
            vec![
                format!(
                    "4.1. Obrigações da {COMPANY_NAME}: executar os serviços descritos na \
                     Cláusula Segunda com pessoal qualificado, dentro dos prazos acordados, \
                     e comunicar ao CONTRATANTE qualquer ocorrência que afete sua execução."
                ),
                format!(
                    "4.2. Obrigações de {}: efetuar os pagamentos nos valores e prazos \
                     acordados e garantir o acesso aos locais onde os serviços serão \
                     prestados.",
                    contract.nome
                ),
            ],
        ),
        Clause::new(
            "CLÁUSULA QUINTA: DA RESCISÃO",
            vec![format!(
                "5.1. O presente contrato poderá ser rescindido por qualquer das partes, \
                 mediante notificação prévia por escrito de {NOTICE_DAYS} dias."
            )],
        ),
        Clause::new(
            "CLÁUSULA SEXTA: DO FORO",
            vec![format!(
                "6.1. Fica eleito o foro da comarca do domicílio do CONTRATANTE, no estado \
                 de {}, para dirimir quaisquer dúvidas ou litígios oriundos do presente \
                 contrato, renunciando as partes a qualquer outro, por mais privilegiado \
                 que seja.",
                contract.estado
            )],
        ),
    ];

    let additional = additional_paragraphs(contract);
    if !additional.is_empty() {
        let mut paragraphs = vec![
            "7.1. As seguintes cláusulas adicionais fazem parte integrante deste instrumento:"
                .to_string(),
        ];
        paragraphs.extend(additional);
        clauses.push(Clause::new(
            "CLÁUSULA SÉTIMA: DAS CLÁUSULAS ADICIONAIS",
            paragraphs,
        ));
    }

    clauses
}
