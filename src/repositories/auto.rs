//! AutoRepository - Repository per le auto con modello e abbildungen

use super::query_builder::{AUTO_COLUMNS, AUTO_FROM, build_count, build_search};
use super::{Create, Delete, Read};
use crate::dtos::{CreateAutoDTO, Pageable, SearchCriteria, UpdateAutoDTO};
use crate::entities::{Abbildung, Auto, AutoArt, Modell};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument, warn};

/// Riga di `auto` unita al suo `modell`
#[derive(Debug, sqlx::FromRow)]
struct AutoRow {
    id: i32,
    version: i32,
    fahrgestellnummer: String,
    ps: i32,
    // ENUM letto come stringa, lo schema ammette solo i valori di `AutoArt`
    art: Option<String>,
    preis: Decimal,
    rabatt: Option<Decimal>,
    lieferbar: Option<bool>,
    datum: Option<NaiveDate>,
    homepage: Option<String>,
    schlagwoerter: Option<String>,
    erzeugt: DateTime<Utc>,
    aktualisiert: DateTime<Utc>,
    modell_id: i32,
    modell: String,
    untertitel: Option<String>,
}

impl From<AutoRow> for Auto {
    fn from(row: AutoRow) -> Self {
        Self {
            id: row.id,
            version: row.version,
            fahrgestellnummer: row.fahrgestellnummer,
            ps: row.ps,
            art: row.art.as_deref().and_then(AutoArt::parse),
            preis: row.preis,
            rabatt: row.rabatt,
            lieferbar: row.lieferbar,
            datum: row.datum,
            homepage: row.homepage,
            schlagwoerter: Auto::split_schlagwoerter(row.schlagwoerter.as_deref()),
            modell: Some(Modell {
                id: row.modell_id,
                modell: row.modell,
                untertitel: row.untertitel,
            }),
            abbildungen: None,
            erzeugt: row.erzeugt,
            aktualisiert: row.aktualisiert,
        }
    }
}

/// Esito di un aggiornamento con controllo di versione
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Aggiornata, con la nuova versione
    Updated(i32),
    NotFound,
    /// La versione del client è più vecchia di quella memorizzata
    VersionOutdated { current: i32 },
}

// AUTO REPOSITORY
pub struct AutoRepository {
    connection_pool: MySqlPool,
}

impl AutoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Legge un'auto con il suo modello, opzionalmente con le abbildungen
    #[instrument(skip(self), fields(auto_id = %id))]
    pub async fn find_by_id(&self, id: i32, with_abbildungen: bool) -> Result<Option<Auto>, Error> {
        debug!("Finding auto by id");
        let sql = format!("SELECT {}{} WHERE a.id = ?", AUTO_COLUMNS, AUTO_FROM);
        let row = sqlx::query_as::<_, AutoRow>(&sql)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        let Some(row) = row else {
            debug!("Auto not found");
            return Ok(None);
        };

        let mut auto = Auto::from(row);
        if with_abbildungen {
            auto.abbildungen = Some(self.find_abbildungen(id).await?);
        }
        Ok(Some(auto))
    }

    #[instrument(skip(self), fields(auto_id = %auto_id))]
    pub async fn find_abbildungen(&self, auto_id: i32) -> Result<Vec<Abbildung>, Error> {
        sqlx::query_as::<_, Abbildung>(
            "SELECT id, beschriftung, content_type FROM abbildung WHERE auto_id = ? ORDER BY id",
        )
        .bind(auto_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Una pagina di auto che soddisfano i criteri, ordinate per id
    #[instrument(skip(self, criteria))]
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        pageable: Pageable,
    ) -> Result<Vec<Auto>, Error> {
        let mut builder = build_search(criteria, pageable);
        debug!("Search query: {}", builder.sql());
        let rows = builder
            .build_query_as::<AutoRow>()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!("Found {} autos", rows.len());
        Ok(rows.into_iter().map(Auto::from).collect())
    }

    /// Numero totale di auto che soddisfano i criteri
    #[instrument(skip(self, criteria))]
    pub async fn count(&self, criteria: &SearchCriteria) -> Result<i64, Error> {
        let mut builder = build_count(criteria);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await
    }

    pub async fn exists_by_fahrgestellnummer(&self, fahrgestellnummer: &str) -> Result<bool, Error> {
        let found = sqlx::query_scalar::<_, i32>("SELECT id FROM auto WHERE fahrgestellnummer = ?")
            .bind(fahrgestellnummer)
            .fetch_optional(&self.connection_pool)
            .await?;
        Ok(found.is_some())
    }

    /// Aggiorna i campi scalari se `expected_version` non è più vecchia di quella memorizzata.
    ///
    /// La riga viene bloccata con `SELECT ... FOR UPDATE` fino al commit, quindi due
    /// aggiornamenti concorrenti con la stessa versione non possono riuscire entrambi.
    /// La nuova versione è sempre quella memorizzata più uno.
    #[instrument(skip(self, data), fields(auto_id = %id, expected_version = %expected_version))]
    pub async fn update_versioned(
        &self,
        id: i32,
        expected_version: i32,
        data: &UpdateAutoDTO,
    ) -> Result<UpdateOutcome, Error> {
        debug!("Updating auto");
        let mut tx = self.connection_pool.begin().await?;

        let current = sqlx::query_scalar::<_, i32>("SELECT version FROM auto WHERE id = ? FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let current = match current {
            Some(version) => version,
            None => {
                debug!("Auto not found");
                return Ok(UpdateOutcome::NotFound);
            }
        };

        if expected_version < current {
            warn!("Outdated version: stored {}, expected {}", current, expected_version);
            return Ok(UpdateOutcome::VersionOutdated { current });
        }

        sqlx::query(
            r#"
            UPDATE auto SET
                version = version + 1,
                fahrgestellnummer = ?,
                ps = ?,
                art = ?,
                preis = ?,
                rabatt = ?,
                lieferbar = ?,
                datum = ?,
                homepage = ?,
                schlagwoerter = ?,
                aktualisiert = UTC_TIMESTAMP()
            WHERE id = ?
            "#,
        )
        .bind(&data.fahrgestellnummer)
        .bind(data.ps)
        .bind(data.art.map(|art| art.as_str()))
        .bind(data.preis)
        .bind(data.rabatt)
        .bind(data.lieferbar)
        .bind(data.datum)
        .bind(&data.homepage)
        .bind(Auto::join_schlagwoerter(&data.schlagwoerter))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let version = current + 1;
        info!("Auto updated to version {}", version);
        Ok(UpdateOutcome::Updated(version))
    }
}

impl Create<Auto, CreateAutoDTO> for AutoRepository {
    /// Inserisce auto, modello e abbildungen in un'unica transazione
    #[instrument(skip(self, data), fields(fahrgestellnummer = %data.fahrgestellnummer))]
    async fn create(&self, data: &CreateAutoDTO) -> Result<Auto, Error> {
        debug!("Creating new auto");
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO auto (version, fahrgestellnummer, ps, art, preis, rabatt, lieferbar,
                              datum, homepage, schlagwoerter, erzeugt, aktualisiert)
            VALUES (0, ?, ?, ?, ?, ?, ?, ?, ?, ?, UTC_TIMESTAMP(), UTC_TIMESTAMP())
            "#,
        )
        .bind(&data.fahrgestellnummer)
        .bind(data.ps)
        .bind(data.art.map(|art| art.as_str()))
        .bind(data.preis)
        .bind(data.rabatt)
        .bind(data.lieferbar)
        .bind(data.datum)
        .bind(&data.homepage)
        .bind(Auto::join_schlagwoerter(&data.schlagwoerter))
        .execute(&mut *tx)
        .await?;

        let new_id = result.last_insert_id() as i32;

        sqlx::query("INSERT INTO modell (modell, untertitel, auto_id) VALUES (?, ?, ?)")
            .bind(&data.modell.modell)
            .bind(&data.modell.untertitel)
            .bind(new_id)
            .execute(&mut *tx)
            .await?;

        for abbildung in &data.abbildungen {
            sqlx::query("INSERT INTO abbildung (beschriftung, content_type, auto_id) VALUES (?, ?, ?)")
                .bind(&abbildung.beschriftung)
                .bind(&abbildung.content_type)
                .bind(new_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("Auto created with id {}", new_id);

        self.find_by_id(new_id, true)
            .await?
            .ok_or(Error::RowNotFound)
    }
}

impl Read<Auto, i32> for AutoRepository {
    async fn read(&self, id: &i32) -> Result<Option<Auto>, Error> {
        self.find_by_id(*id, false).await
    }
}

impl Delete<i32> for AutoRepository {
    /// Cancella l'auto e tutto ciò che le appartiene
    #[instrument(skip(self), fields(auto_id = %id))]
    async fn delete(&self, id: &i32) -> Result<bool, Error> {
        debug!("Deleting auto");
        let mut tx = self.connection_pool.begin().await?;

        // prima modello, abbildungen e file, poi l'auto
        for sql in [
            "DELETE FROM modell WHERE auto_id = ?",
            "DELETE FROM abbildung WHERE auto_id = ?",
            "DELETE FROM auto_file WHERE auto_id = ?",
        ] {
            sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM auto WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Auto deleted successfully");
        } else {
            debug!("No auto to delete");
        }
        Ok(deleted)
    }
}

#[cfg(all(test, feature = "db-tests"))]
mod tests {
    use super::*;
    use crate::dtos::{CreateAbbildungDTO, CreateModellDTO, FilterColumn, FilterValue, Tag};
    use sqlx::MySqlPool;
    use std::str::FromStr;

    fn new_auto(fahrgestellnummer: &str) -> CreateAutoDTO {
        CreateAutoDTO {
            fahrgestellnummer: fahrgestellnummer.to_string(),
            ps: 7,
            art: Some(AutoArt::Cabrio),
            preis: Decimal::from_str("99.99").unwrap(),
            rabatt: Some(Decimal::from_str("0.123").unwrap()),
            lieferbar: Some(true),
            datum: NaiveDate::from_ymd_opt(2022, 2, 28),
            homepage: Some("https://post.rest".to_string()),
            schlagwoerter: vec!["JAVASCRIPT".to_string(), "PYTHON".to_string()],
            modell: CreateModellDTO {
                modell: "Omega".to_string(),
                untertitel: None,
            },
            abbildungen: vec![CreateAbbildungDTO {
                beschriftung: "Abb. 1".to_string(),
                content_type: "img/png".to_string(),
            }],
        }
    }

    fn update_of(auto: &Auto) -> UpdateAutoDTO {
        UpdateAutoDTO {
            fahrgestellnummer: auto.fahrgestellnummer.clone(),
            ps: auto.ps + 1,
            art: auto.art,
            preis: auto.preis,
            rabatt: auto.rabatt,
            lieferbar: auto.lieferbar,
            datum: auto.datum,
            homepage: auto.homepage.clone(),
            schlagwoerter: auto.schlagwoerter.clone(),
        }
    }

    /*------------------------------------------- */
    /* Unit tests: find_by_id                      */
    /*------------------------------------------- */

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_find_by_id_with_abbildungen(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);

        let auto = repo.find_by_id(1, true).await?.expect("auto 1 exists");
        assert_eq!(auto.fahrgestellnummer, "WVWZZZ1JZXW000001");
        assert_eq!(auto.art, Some(AutoArt::Suv));
        assert_eq!(auto.schlagwoerter, vec!["JAVASCRIPT".to_string()]);
        assert_eq!(auto.modell.as_ref().map(|m| m.modell.as_str()), Some("Alpha"));
        assert_eq!(auto.abbildungen.as_ref().map(Vec::len), Some(1));

        let without = repo.find_by_id(1, false).await?.expect("auto 1 exists");
        assert!(without.abbildungen.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_find_by_id_null_columns(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let auto = repo.find_by_id(50, false).await?.expect("auto 50 exists");
        assert_eq!(auto.art, None);
        assert!(auto.schlagwoerter.is_empty());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_find_by_id_missing(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        assert!(repo.find_by_id(999, true).await?.is_none());
        Ok(())
    }

    /*------------------------------------------- */
    /* Unit tests: search / count                  */
    /*------------------------------------------- */

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_search_paging_and_count(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let criteria = SearchCriteria::default();

        let first = repo.search(&criteria, Pageable { number: 0, size: 2 }).await?;
        let ids: Vec<i32> = first.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 20]);

        let last = repo.search(&criteria, Pageable { number: 2, size: 2 }).await?;
        assert_eq!(last.iter().map(|a| a.id).collect::<Vec<_>>(), vec![50]);

        assert_eq!(repo.count(&criteria).await?, 5);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_search_modell_substring_case_insensitive(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let criteria = SearchCriteria {
            modell: Some("ALP".to_string()),
            ..Default::default()
        };
        let found = repo.search(&criteria, Pageable::default()).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_search_thresholds(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let criteria = SearchCriteria {
            ps: Some(3),
            preis: Some(Decimal::from_str("40").unwrap()),
            ..Default::default()
        };
        let found = repo.search(&criteria, Pageable::default()).await?;
        // ps >= 3: auto 1 (4) e 40 (3); preis <= 40 esclude la 40
        assert_eq!(found.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(repo.count(&criteria).await?, 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_search_java_ignores_javascript(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let criteria = SearchCriteria {
            tags: vec![Tag::Java],
            ..Default::default()
        };
        let found = repo.search(&criteria, Pageable::default()).await?;
        assert_eq!(found.iter().map(|a| a.id).collect::<Vec<_>>(), vec![40]);

        let criteria = SearchCriteria {
            tags: vec![Tag::Javascript, Tag::Typescript],
            ..Default::default()
        };
        let found = repo.search(&criteria, Pageable::default()).await?;
        assert_eq!(found.iter().map(|a| a.id).collect::<Vec<_>>(), vec![30]);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_search_equality_filters(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let criteria = SearchCriteria {
            filters: vec![
                (FilterColumn::Art, FilterValue::Text("SUV".to_string())),
                (FilterColumn::Lieferbar, FilterValue::Bool(true)),
            ],
            ..Default::default()
        };
        let found = repo.search(&criteria, Pageable::default()).await?;
        assert_eq!(found.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 40]);
        Ok(())
    }

    /*------------------------------------------- */
    /* Unit tests: create / update / delete        */
    /*------------------------------------------- */

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_create_inserts_sub_entities(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let created = repo.create(&new_auto("WVWZZZ1JZXW999999")).await?;

        assert!(created.id > 50);
        assert_eq!(created.version, 0);
        assert_eq!(created.modell.as_ref().map(|m| m.modell.as_str()), Some("Omega"));
        assert_eq!(created.abbildungen.as_ref().map(Vec::len), Some(1));
        assert_eq!(created.schlagwoerter.len(), 2);
        assert!(repo.exists_by_fahrgestellnummer("WVWZZZ1JZXW999999").await?);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_create_duplicate_rolls_back(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let result = repo.create(&new_auto("WVWZZZ1JZXW000001")).await;
        assert!(matches!(result, Err(Error::Database(ref e)) if e.is_unique_violation()));
        assert_eq!(repo.count(&SearchCriteria::default()).await?, 5);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_update_versioned(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool);
        let auto = repo.find_by_id(40, false).await?.expect("auto 40 exists");
        let data = update_of(&auto);

        assert_eq!(repo.update_versioned(40, 0, &data).await?, UpdateOutcome::Updated(1));
        assert_eq!(
            repo.update_versioned(40, 0, &data).await?,
            UpdateOutcome::VersionOutdated { current: 1 }
        );
        // una versione più recente di quella memorizzata non è superata
        assert_eq!(repo.update_versioned(40, 5, &data).await?, UpdateOutcome::Updated(2));
        assert_eq!(repo.update_versioned(999, 0, &data).await?, UpdateOutcome::NotFound);

        let updated = repo.find_by_id(40, false).await?.expect("auto 40 exists");
        assert_eq!(updated.version, 2);
        assert_eq!(updated.ps, auto.ps + 1);
        assert!(updated.aktualisiert >= auto.aktualisiert);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("autos")))]
    async fn test_delete_cascades(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AutoRepository::new(pool.clone());

        assert!(repo.delete(&1).await?);
        assert!(repo.find_by_id(1, false).await?.is_none());
        assert!(repo.find_abbildungen(1).await?.is_empty());

        let modelle: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modell WHERE auto_id = 1")
            .fetch_one(&pool)
            .await?;
        assert_eq!(modelle, 0);

        assert!(!repo.delete(&1).await?);
        Ok(())
    }
}
