use crate::core::age::{birth_date_bounds, today};
use crate::models::{
    DistanceUnit, DomainError, Gender, NotificationType, Preferences, PreferencesRecord, Profile, ProfileRecord,
    RelationshipStatus, SearchCriteria,
};
use crate::services::repository::{PreferencesRepository, ProfileRepository, RepositoryError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, user_id, bio, date_of_birth, gender, height_cm, weight_kg, location, \
     occupation, education, relationship_status, interests, photos, is_visible, created_at, updated_at";

const PREFERENCES_COLUMNS: &str = "id, user_id, preferred_genders, min_age, max_age, max_distance, distance_unit, \
     preferred_interests, deal_breakers, show_only_verified_profiles, show_only_with_photos, \
     allow_messages_from_matches, allow_messages_from_everyone, show_online_status, show_last_seen, \
     push_notifications, email_notifications, match_notifications, message_notifications, like_notifications, \
     created_at, updated_at";

/// Arrival order breaks `updated_at` ties
const NEWEST_FIRST: &str = " ORDER BY updated_at DESC, seq ASC";

/// Shared PostgreSQL connection pool
///
/// Migrations in `./migrations` run once on connect.
#[derive(Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Connected to PostgreSQL (max {} connections)", max_connections);

        Ok(Self { pool })
    }

    pub fn profiles(&self) -> PgProfileRepository {
        PgProfileRepository::new(self.pool.clone())
    }

    pub fn preferences(&self) -> PgPreferencesRepository {
        PgPreferencesRepository::new(self.pool.clone())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, RepositoryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Map a unique-index violation to `Conflict`
fn map_insert_error(err: sqlx::Error, what: &str) -> RepositoryError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(format!("{} already exists", what))
        }
        other => RepositoryError::SqlxError(other),
    }
}

fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    value.as_deref().map(T::from_str).transpose()
}

fn to_u16(value: Option<i32>, field: &'static str) -> Result<Option<u16>, DomainError> {
    value
        .map(|v| {
            u16::try_from(v).map_err(|_| DomainError::UnknownValue {
                field,
                value: v.to_string(),
            })
        })
        .transpose()
}

fn to_u32(value: i32, field: &'static str) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| DomainError::UnknownValue {
        field,
        value: value.to_string(),
    })
}

fn profile_from_row(row: &PgRow) -> Result<Profile, RepositoryError> {
    let record = ProfileRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        bio: row.try_get("bio")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender: parse_opt::<Gender>(row.try_get("gender")?)?,
        height_cm: to_u16(row.try_get("height_cm")?, "height_cm")?,
        weight_kg: to_u16(row.try_get("weight_kg")?, "weight_kg")?,
        location: row.try_get("location")?,
        occupation: row.try_get("occupation")?,
        education: row.try_get("education")?,
        relationship_status: parse_opt::<RelationshipStatus>(row.try_get("relationship_status")?)?,
        interests: row.try_get("interests")?,
        photos: row.try_get("photos")?,
        is_visible: row.try_get("is_visible")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    Ok(Profile::restore(record))
}

fn preferences_from_row(row: &PgRow) -> Result<Preferences, RepositoryError> {
    let genders: Vec<String> = row.try_get("preferred_genders")?;
    let unit: String = row.try_get("distance_unit")?;

    let record = PreferencesRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        preferred_genders: genders
            .iter()
            .map(|g| Gender::from_str(g))
            .collect::<Result<_, _>>()?,
        min_age: to_u32(row.try_get("min_age")?, "min_age")?,
        max_age: to_u32(row.try_get("max_age")?, "max_age")?,
        max_distance: to_u32(row.try_get("max_distance")?, "max_distance")?,
        distance_unit: DistanceUnit::from_str(&unit)?,
        preferred_interests: row.try_get("preferred_interests")?,
        deal_breakers: row.try_get("deal_breakers")?,
        show_only_verified_profiles: row.try_get("show_only_verified_profiles")?,
        show_only_with_photos: row.try_get("show_only_with_photos")?,
        allow_messages_from_matches: row.try_get("allow_messages_from_matches")?,
        allow_messages_from_everyone: row.try_get("allow_messages_from_everyone")?,
        show_online_status: row.try_get("show_online_status")?,
        show_last_seen: row.try_get("show_last_seen")?,
        push_notifications: row.try_get("push_notifications")?,
        email_notifications: row.try_get("email_notifications")?,
        match_notifications: row.try_get("match_notifications")?,
        message_notifications: row.try_get("message_notifications")?,
        like_notifications: row.try_get("like_notifications")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    Ok(Preferences::restore(record)?)
}

/// Profile store backed by the `profiles` table
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_visible(exclude_user_id: Option<&str>) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM profiles WHERE is_visible = TRUE",
            PROFILE_COLUMNS
        ));
        if let Some(user_id) = exclude_user_id {
            qb.push(" AND user_id <> ").push_bind(user_id.to_string());
        }
        qb
    }

    async fn fetch(&self, mut qb: QueryBuilder<'_, Postgres>) -> Result<Vec<Profile>, RepositoryError> {
        qb.push(NEWEST_FIRST);
        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(profile_from_row).collect()
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let record = profile.to_record();
        let query = r#"
            INSERT INTO profiles (
                id, user_id, bio, date_of_birth, gender, height_cm, weight_kg, location,
                occupation, education, relationship_status, interests, photos,
                is_visible, is_complete, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#;

        sqlx::query(query)
            .bind(record.id)
            .bind(&record.user_id)
            .bind(&record.bio)
            .bind(record.date_of_birth)
            .bind(record.gender.map(|g| g.as_str()))
            .bind(record.height_cm.map(i32::from))
            .bind(record.weight_kg.map(i32::from))
            .bind(&record.location)
            .bind(&record.occupation)
            .bind(&record.education)
            .bind(record.relationship_status.map(|s| s.as_str()))
            .bind(&record.interests)
            .bind(&record.photos)
            .bind(record.is_visible)
            .bind(profile.is_complete())
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, "profile"))?;

        tracing::debug!("Inserted profile {} for user {}", record.id, record.user_id);

        Ok(profile.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, RepositoryError> {
        let query = format!("SELECT {} FROM profiles WHERE user_id = $1", PROFILE_COLUMNS);
        let row = sqlx::query(&query).bind(user_id).fetch_optional(&self.pool).await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    async fn update(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let record = profile.to_record();
        let query = r#"
            UPDATE profiles SET
                bio = $2, date_of_birth = $3, gender = $4, height_cm = $5, weight_kg = $6,
                location = $7, occupation = $8, education = $9, relationship_status = $10,
                interests = $11, photos = $12, is_visible = $13, is_complete = $14, updated_at = $15
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(record.id)
            .bind(&record.bio)
            .bind(record.date_of_birth)
            .bind(record.gender.map(|g| g.as_str()))
            .bind(record.height_cm.map(i32::from))
            .bind(record.weight_kg.map(i32::from))
            .bind(&record.location)
            .bind(&record.occupation)
            .bind(&record.education)
            .bind(record.relationship_status.map(|s| s.as_str()))
            .bind(&record.interests)
            .bind(&record.photos)
            .bind(record.is_visible)
            .bind(profile.is_complete())
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "Profile", id: record.id });
        }

        Ok(profile.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "Profile", id });
        }
        Ok(())
    }

    async fn find_visible_profiles(&self, exclude_user_id: Option<&str>) -> Result<Vec<Profile>, RepositoryError> {
        self.fetch(Self::select_visible(exclude_user_id)).await
    }

    async fn find_profiles_by_location(
        &self,
        location: &str,
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, RepositoryError> {
        let mut qb = Self::select_visible(exclude_user_id);
        qb.push(" AND strpos(lower(location), lower(")
            .push_bind(location.to_string())
            .push(")) > 0");
        self.fetch(qb).await
    }

    async fn find_profiles_by_interests(
        &self,
        interests: &[String],
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, RepositoryError> {
        let mut qb = Self::select_visible(exclude_user_id);
        qb.push(" AND interests && ").push_bind(interests.to_vec());
        self.fetch(qb).await
    }

    async fn find_complete_profiles(&self, exclude_user_id: Option<&str>) -> Result<Vec<Profile>, RepositoryError> {
        let mut qb = Self::select_visible(exclude_user_id);
        qb.push(" AND is_complete = TRUE");
        self.fetch(qb).await
    }

    async fn search_profiles(&self, criteria: &SearchCriteria) -> Result<Vec<Profile>, RepositoryError> {
        let mut qb = Self::select_visible(criteria.exclude_user_id.as_deref());

        if criteria.has_age_bounds() {
            let bounds = birth_date_bounds(criteria.min_age, criteria.max_age, today());
            qb.push(" AND date_of_birth IS NOT NULL");
            if let Some(earliest) = bounds.earliest {
                qb.push(" AND date_of_birth >= ").push_bind(earliest);
            }
            if let Some(latest) = bounds.latest {
                qb.push(" AND date_of_birth <= ").push_bind(latest);
            }
        }

        if let Some(location) = criteria.location.as_deref() {
            qb.push(" AND strpos(lower(location), lower(")
                .push_bind(location.to_string())
                .push(")) > 0");
        }

        if let Some(interests) = criteria.interests.as_ref().filter(|i| !i.is_empty()) {
            let tags: Vec<String> = interests.iter().cloned().collect();
            qb.push(" AND interests && ").push_bind(tags);
        }

        if let Some(gender) = criteria.gender {
            qb.push(" AND gender = ").push_bind(gender.as_str());
        }

        self.fetch(qb).await
    }
}

/// Preferences store backed by the `preferences` table
#[derive(Clone)]
pub struct PgPreferencesRepository {
    pool: PgPool,
}

impl PgPreferencesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn gender_names(record: &PreferencesRecord) -> Vec<String> {
    record.preferred_genders.iter().map(|g| g.as_str().to_string()).collect()
}

#[async_trait]
impl PreferencesRepository for PgPreferencesRepository {
    async fn create(&self, preferences: &Preferences) -> Result<Preferences, RepositoryError> {
        let record = preferences.to_record();
        let query = format!(
            "INSERT INTO preferences ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)",
            PREFERENCES_COLUMNS
        );

        sqlx::query(&query)
            .bind(record.id)
            .bind(&record.user_id)
            .bind(gender_names(&record))
            .bind(record.min_age as i32)
            .bind(record.max_age as i32)
            .bind(record.max_distance as i32)
            .bind(record.distance_unit.as_str())
            .bind(&record.preferred_interests)
            .bind(&record.deal_breakers)
            .bind(record.show_only_verified_profiles)
            .bind(record.show_only_with_photos)
            .bind(record.allow_messages_from_matches)
            .bind(record.allow_messages_from_everyone)
            .bind(record.show_online_status)
            .bind(record.show_last_seen)
            .bind(record.push_notifications)
            .bind(record.email_notifications)
            .bind(record.match_notifications)
            .bind(record.message_notifications)
            .bind(record.like_notifications)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, "preferences"))?;

        tracing::debug!("Inserted preferences {} for user {}", record.id, record.user_id);

        Ok(preferences.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Preferences>, RepositoryError> {
        let query = format!("SELECT {} FROM preferences WHERE id = $1", PREFERENCES_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(preferences_from_row).transpose()
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Preferences>, RepositoryError> {
        let query = format!("SELECT {} FROM preferences WHERE user_id = $1", PREFERENCES_COLUMNS);
        let row = sqlx::query(&query).bind(user_id).fetch_optional(&self.pool).await?;
        row.as_ref().map(preferences_from_row).transpose()
    }

    async fn update(&self, preferences: &Preferences) -> Result<Preferences, RepositoryError> {
        let record = preferences.to_record();
        let query = r#"
            UPDATE preferences SET
                preferred_genders = $2, min_age = $3, max_age = $4, max_distance = $5,
                distance_unit = $6, preferred_interests = $7, deal_breakers = $8,
                show_only_verified_profiles = $9, show_only_with_photos = $10,
                allow_messages_from_matches = $11, allow_messages_from_everyone = $12,
                show_online_status = $13, show_last_seen = $14,
                push_notifications = $15, email_notifications = $16, match_notifications = $17,
                message_notifications = $18, like_notifications = $19, updated_at = $20
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(record.id)
            .bind(gender_names(&record))
            .bind(record.min_age as i32)
            .bind(record.max_age as i32)
            .bind(record.max_distance as i32)
            .bind(record.distance_unit.as_str())
            .bind(&record.preferred_interests)
            .bind(&record.deal_breakers)
            .bind(record.show_only_verified_profiles)
            .bind(record.show_only_with_photos)
            .bind(record.allow_messages_from_matches)
            .bind(record.allow_messages_from_everyone)
            .bind(record.show_online_status)
            .bind(record.show_last_seen)
            .bind(record.push_notifications)
            .bind(record.email_notifications)
            .bind(record.match_notifications)
            .bind(record.message_notifications)
            .bind(record.like_notifications)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "Preferences", id: record.id });
        }

        Ok(preferences.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM preferences WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "Preferences", id });
        }
        Ok(())
    }

    async fn find_users_with_notifications_enabled(
        &self,
        kind: NotificationType,
    ) -> Result<Vec<String>, RepositoryError> {
        // Column name comes from a closed enum, never from input
        let query = format!(
            "SELECT user_id FROM preferences WHERE {} = TRUE ORDER BY created_at",
            kind.column()
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let user_ids = rows
            .iter()
            .map(|row| row.try_get("user_id"))
            .collect::<Result<Vec<String>, _>>()?;

        tracing::debug!("{} users have {:?} enabled", user_ids.len(), kind);

        Ok(user_ids)
    }

    async fn find_by_user_ids(&self, user_ids: &[String]) -> Result<Vec<Preferences>, RepositoryError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {} FROM preferences WHERE user_id = ANY($1)",
            PREFERENCES_COLUMNS
        );
        let rows = sqlx::query(&query).bind(user_ids).fetch_all(&self.pool).await?;
        rows.iter().map(preferences_from_row).collect()
    }
}
