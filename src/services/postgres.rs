use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::models::{
    BuildingAddress, BuildingCandidate, BuildingFilter, Candidate, Geometry, ParcelCandidate,
    ParcelQuery,
};
use crate::services::registry::{ParcelRegistry, RegistryError};

const FIND_PARCELS_SQL: &str = r#"
    SELECT
        p.id::int8 AS id,
        p.parcela_stevilka,
        p.ko_sifra,
        p.ko_ime,
        p.povrsina::float8 AS povrsina,
        ST_AsGeoJSON(ST_Transform(p.geom, $4))::json AS geometry
    FROM parcele p
    WHERE p.povrsina BETWEEN $1 AND $2
      AND p.ko_ime ILIKE $3
    ORDER BY p.id
"#;

const JOIN_BUILDINGS_SQL: &str = r#"
    SELECT
        s.id::int8 AS id,
        s.parcela_id::int8 AS parcela_id,
        s.stavba_stevilka,
        s.leto_izgradnje,
        s.neto_tloris::float8 AS neto_tloris,
        s.stevilo_etaz,
        s.tip,
        s.naslov_ulica,
        s.naslov_hisna_st,
        s.naslov_naselje,
        s.naslov_posta,
        s.naslov_postna_st
    FROM stavbe s
    WHERE s.parcela_id = ANY($1)
      AND ($2::int4 IS NULL OR s.leto_izgradnje BETWEEN $2 AND $3)
      AND ($4::float8 IS NULL OR s.neto_tloris BETWEEN $4 AND $5)
    ORDER BY s.parcela_id, s.id
"#;

/// PostGIS-backed cadastral registry
///
/// Reads the `parcele` and `stavbe` tables of the GURS import. Geometries are
/// reprojected by PostGIS into `output_srid` and returned as GeoJSON.
pub struct PostgisRegistry {
    pool: PgPool,
    output_srid: i32,
}

impl PostgisRegistry {
    /// Create a new registry from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
        output_srid: i32,
    ) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool, output_srid })
    }

    /// Create a new registry from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, RegistryError> {
        tracing::info!("Connecting to cadastral registry (output SRID {})", settings.output_srid);

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
            settings.output_srid,
        )
        .await
    }
}

#[async_trait]
impl ParcelRegistry for PostgisRegistry {
    async fn find_parcels(&self, query: &ParcelQuery) -> Result<Vec<ParcelCandidate>, RegistryError> {
        let pattern = contains_pattern(&query.settlement_token);

        let rows = sqlx::query(FIND_PARCELS_SQL)
            .bind(query.area_band.min)
            .bind(query.area_band.max)
            .bind(&pattern)
            .bind(self.output_srid)
            .fetch_all(&self.pool)
            .await?;

        let parcels = rows
            .iter()
            .map(parcel_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Registry returned {} parcels for pattern {} in [{:.2}, {:.2}]",
            parcels.len(),
            pattern,
            query.area_band.min,
            query.area_band.max
        );

        Ok(parcels)
    }

    async fn join_buildings(
        &self,
        parcels: &[ParcelCandidate],
        filter: &BuildingFilter,
    ) -> Result<Vec<Candidate>, RegistryError> {
        if parcels.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = parcels.iter().map(|parcel| parcel.id).collect();
        let by_id: HashMap<i64, &ParcelCandidate> =
            parcels.iter().map(|parcel| (parcel.id, parcel)).collect();

        let rows = sqlx::query(JOIN_BUILDINGS_SQL)
            .bind(&ids)
            .bind(filter.year_band.map(|band| band.min))
            .bind(filter.year_band.map(|band| band.max))
            .bind(filter.floor_area_band.map(|band| band.min))
            .bind(filter.floor_area_band.map(|band| band.max))
            .fetch_all(&self.pool)
            .await?;

        let mut pairs = Vec::with_capacity(rows.len());
        for row in &rows {
            let building = building_from_row(row)?;
            if let Some(parcel) = by_id.get(&building.parcel_id) {
                pairs.push(Candidate::with_building((*parcel).clone(), building));
            }
        }

        tracing::debug!(
            "Building join kept {} pairs from {} parcels",
            pairs.len(),
            parcels.len()
        );

        Ok(pairs)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, RegistryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn parcel_from_row(row: &PgRow) -> Result<ParcelCandidate, sqlx::Error> {
    let geometry: Option<serde_json::Value> = row.try_get("geometry")?;

    Ok(ParcelCandidate {
        id: row.try_get("id")?,
        parcel_number: row.try_get("parcela_stevilka")?,
        cadastral_municipality_code: row.try_get("ko_sifra")?,
        cadastral_municipality_name: row.try_get("ko_ime")?,
        area_m2: row.try_get("povrsina")?,
        geometry: geometry.map(Geometry::new),
    })
}

fn building_from_row(row: &PgRow) -> Result<BuildingCandidate, sqlx::Error> {
    Ok(BuildingCandidate {
        id: row.try_get("id")?,
        parcel_id: row.try_get("parcela_id")?,
        building_number: row.try_get("stavba_stevilka")?,
        construction_year: row.try_get("leto_izgradnje")?,
        net_floor_area_m2: row.try_get("neto_tloris")?,
        story_count: row.try_get("stevilo_etaz")?,
        type_label: row.try_get("tip")?,
        address: BuildingAddress {
            street: row.try_get("naslov_ulica")?,
            house_number: row.try_get("naslov_hisna_st")?,
            settlement: row.try_get("naslov_naselje")?,
            post_office: row.try_get("naslov_posta")?,
            postal_code: row.try_get("naslov_postna_st")?,
        },
    })
}

/// `ILIKE` pattern matching names that contain `token`, with wildcards escaped
fn contains_pattern(token: &str) -> String {
    let escaped = token
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    format!("%{}%", escaped)
}
