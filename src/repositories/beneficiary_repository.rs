use async_trait::async_trait;
use chrono::Local;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Beneficiary, BeneficiaryData, Page, PageRequest};
use crate::repositories::filters::BeneficiaryFilter;
use crate::repositories::pg_store::{db_error, push_page, PgStore, BENEFICIARY_COLUMNS};
use crate::repositories::BeneficiaryStore;
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
impl BeneficiaryStore for PgStore {
    async fn create_beneficiary(&self, data: &BeneficiaryData) -> AppResult<Beneficiary> {
        let id = Uuid::new_v4();

        let beneficiary = sqlx::query_as::<_, Beneficiary>(&format!(
            r#"
            INSERT INTO beneficiario (id, nome, endereco, telefone, descricao, status, data_inscricao)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            BENEFICIARY_COLUMNS
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.phone)
        .bind(&data.description)
        .bind(data.status)
        .bind(Local::now().date_naive())
        .fetch_one(self.pool())
        .await
        .map_err(db_error("creating beneficiary"))?;

        log::info!("✅ Beneficiary {} created", beneficiary.id);
        Ok(beneficiary)
    }

    async fn update_beneficiary(&self, id: Uuid, data: &BeneficiaryData) -> AppResult<Option<Beneficiary>> {
        let beneficiary = sqlx::query_as::<_, Beneficiary>(&format!(
            r#"
            UPDATE beneficiario
            SET nome = $2, endereco = $3, telefone = $4, descricao = $5, status = $6
            WHERE id = $1
            RETURNING {}
            "#,
            BENEFICIARY_COLUMNS
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.phone)
        .bind(&data.description)
        .bind(data.status)
        .fetch_optional(self.pool())
        .await
        .map_err(db_error("updating beneficiary"))?;

        Ok(beneficiary)
    }

    async fn delete_beneficiary(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM beneficiario WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| AppError::from_delete(e, "Beneficiary"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_beneficiary(&self, id: Uuid) -> AppResult<Option<Beneficiary>> {
        sqlx::query_as::<_, Beneficiary>(&format!(
            "SELECT {} FROM beneficiario WHERE id = $1",
            BENEFICIARY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_error("finding beneficiary"))
    }

    async fn find_beneficiaries(
        &self,
        filter: &BeneficiaryFilter,
        page: PageRequest,
    ) -> AppResult<Page<Beneficiary>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM beneficiario");
        filter.push_predicates(&mut count);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(db_error("counting beneficiaries"))?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM beneficiario",
            BENEFICIARY_COLUMNS
        ));
        filter.push_predicates(&mut qb);
        qb.push(" ORDER BY nome, id");
        push_page(&mut qb, page);

        let beneficiaries = qb
            .build_query_as::<Beneficiary>()
            .fetch_all(self.pool())
            .await
            .map_err(db_error("searching beneficiaries"))?;

        Ok(Page::new(beneficiaries, total, page))
    }

    async fn beneficiary_in_use(&self, id: Uuid) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM entrega WHERE beneficiario_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(db_error("checking beneficiary references"))?;

        Ok(result.0)
    }
}
