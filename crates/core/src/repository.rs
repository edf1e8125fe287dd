use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mnemosyne_entities::prelude::{CanonicalEntity, ChatEvent, EntityAlias, EpisodicMemory, MemorySummary, ProceduralMemory, SemanticMemory};
use mnemosyne_entities::{
  canonical_entity, chat_event, entity_alias, episodic_memory, memory_conflict, memory_summary, procedural_memory, semantic_memory,
};
use mnemosyne_shared::AppError;
use sea_orm::prelude::PgVector;
use sea_orm::sea_query::Expr;
use sea_orm::{
  ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
  QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::ports::{
  ChatEventRepository, ConflictRepository, DomainDbPort, DomainFact, EntityCandidate, EntityRepository, EpisodicMemoryRepository,
  ProceduralMemoryRepository, SemanticMemoryRepository, SummaryRepository,
};
use crate::validation::ReinforceDiff;

/// Repositories backed by a single pooled Postgres connection. One struct
/// implements every port this crate declares: the concrete query shapes
/// differ per port, but there's exactly one place that owns the connection.
pub struct PgRepositories {
  pub db: DatabaseConnection,
}

impl PgRepositories {
  #[must_use]
  pub const fn new(db: DatabaseConnection) -> Self {
    Self { db }
  }
}

#[async_trait]
impl ChatEventRepository for PgRepositories {
  async fn find_by_session_and_hash(&self, session_id: Uuid, content_hash: &str) -> Result<Option<chat_event::Model>, AppError> {
    Ok(
      ChatEvent::find()
        .filter(chat_event::Column::SessionId.eq(session_id))
        .filter(chat_event::Column::ContentHash.eq(content_hash))
        .one(&self.db)
        .await?,
    )
  }

  async fn insert(&self, model: chat_event::Model) -> Result<chat_event::Model, AppError> {
    let active = chat_event::ActiveModel {
      user_id: Set(model.user_id),
      session_id: Set(model.session_id),
      role: Set(model.role),
      content: Set(model.content),
      content_hash: Set(model.content_hash),
      metadata: Set(model.metadata),
      created_at: Set(model.created_at),
      ..Default::default()
    };
    Ok(active.insert(&self.db).await?)
  }
}

#[derive(Debug, FromQueryResult)]
struct SimilarityRow {
  entity_id: String,
  canonical_name: String,
  similarity: f64,
}

#[async_trait]
impl EntityRepository for PgRepositories {
  async fn find_by_exact_name(&self, user_id: Uuid, name: &str) -> Result<Option<canonical_entity::Model>, AppError> {
    Ok(
      CanonicalEntity::find()
        .filter(canonical_entity::Column::OwnerUserId.eq(user_id))
        .filter(Expr::cust_with_values("lower(canonical_name) = lower($1)", [name]))
        .one(&self.db)
        .await?,
    )
  }

  async fn find_alias(&self, user_id: Uuid, alias_text: &str) -> Result<Option<entity_alias::Model>, AppError> {
    Ok(
      EntityAlias::find()
        .filter(entity_alias::Column::UserId.eq(user_id.to_string()))
        .filter(Expr::cust_with_values("lower(alias_text) = lower($1)", [alias_text]))
        .one(&self.db)
        .await?,
    )
  }

  async fn fuzzy_candidates(&self, user_id: Uuid, text: &str, threshold: f64) -> Result<Vec<EntityCandidate>, AppError> {
    let stmt = Statement::from_sql_and_values(
      self.db.get_database_backend(),
      r"
      SELECT e.entity_id AS entity_id, e.canonical_name AS canonical_name,
             GREATEST(similarity(e.canonical_name, $1), COALESCE(MAX(similarity(a.alias_text, $1)), 0)) AS similarity
      FROM canonical_entity e
      LEFT JOIN entity_alias a ON a.canonical_entity_id = e.entity_id
      WHERE e.owner_user_id = $2
      GROUP BY e.entity_id, e.canonical_name
      HAVING GREATEST(similarity(e.canonical_name, $1), COALESCE(MAX(similarity(a.alias_text, $1)), 0)) >= $3
      ORDER BY similarity DESC
      LIMIT 5
      ",
      [text.into(), user_id.to_string().into(), threshold.into()],
    );
    let rows = SimilarityRow::find_by_statement(stmt).all(&self.db).await?;
    Ok(
      rows
        .into_iter()
        .map(|r| EntityCandidate {
          entity_id: r.entity_id,
          canonical_name: r.canonical_name,
          similarity: r.similarity,
        })
        .collect(),
    )
  }

  async fn get(&self, entity_id: &str) -> Result<Option<canonical_entity::Model>, AppError> {
    Ok(CanonicalEntity::find_by_id(entity_id.to_owned()).one(&self.db).await?)
  }

  async fn create(&self, model: canonical_entity::Model) -> Result<canonical_entity::Model, AppError> {
    let active = canonical_entity::ActiveModel {
      entity_id: Set(model.entity_id),
      entity_type: Set(model.entity_type),
      canonical_name: Set(model.canonical_name),
      external_ref_table: Set(model.external_ref_table),
      external_ref_id: Set(model.external_ref_id),
      properties: Set(model.properties),
      created_at: Set(model.created_at),
      updated_at: Set(model.updated_at),
      owner_user_id: Set(model.owner_user_id),
    };
    Ok(active.insert(&self.db).await?)
  }

  async fn upsert_alias(
    &self,
    canonical_entity_id: &str,
    user_id: Option<Uuid>,
    alias_text: &str,
    source: &str,
    confidence: f64,
  ) -> Result<entity_alias::Model, AppError> {
    let existing = EntityAlias::find()
      .filter(entity_alias::Column::CanonicalEntityId.eq(canonical_entity_id))
      .filter(entity_alias::Column::AliasText.eq(alias_text))
      .one(&self.db)
      .await?;

    if let Some(existing) = existing {
      let mut active: entity_alias::ActiveModel = existing.clone().into();
      active.usage_count = Set(existing.usage_count + 1);
      active.confidence = Set((existing.confidence + 0.02_f64).min(0.95));
      return Ok(active.update(&self.db).await?);
    }

    let active = entity_alias::ActiveModel {
      canonical_entity_id: Set(canonical_entity_id.to_owned()),
      alias_text: Set(alias_text.to_owned()),
      user_id: Set(user_id.map(|u| u.to_string())),
      alias_source: Set(source.to_owned()),
      confidence: Set(confidence.min(0.9)),
      usage_count: Set(1),
      created_at: Set(Utc::now().into()),
      ..Default::default()
    };
    Ok(active.insert(&self.db).await?)
  }
}

#[async_trait]
impl SemanticMemoryRepository for PgRepositories {
  async fn find_active_by_subject_predicate(
    &self,
    user_id: Uuid,
    subject_entity_id: &str,
    predicate: &str,
  ) -> Result<Vec<semantic_memory::Model>, AppError> {
    Ok(
      SemanticMemory::find()
        .filter(semantic_memory::Column::UserId.eq(user_id))
        .filter(semantic_memory::Column::SubjectEntityId.eq(subject_entity_id))
        .filter(semantic_memory::Column::Predicate.eq(predicate))
        .filter(semantic_memory::Column::Status.is_in(["active", "aging"]))
        .all(&self.db)
        .await?,
    )
  }

  async fn find_active_by_subject(&self, user_id: Uuid, subject_entity_id: &str) -> Result<Vec<semantic_memory::Model>, AppError> {
    Ok(
      SemanticMemory::find()
        .filter(semantic_memory::Column::UserId.eq(user_id))
        .filter(semantic_memory::Column::SubjectEntityId.eq(subject_entity_id))
        .filter(semantic_memory::Column::Status.is_in(["active", "aging"]))
        .all(&self.db)
        .await?,
    )
  }

  async fn insert(&self, model: semantic_memory::Model) -> Result<semantic_memory::Model, AppError> {
    let active = semantic_memory::ActiveModel {
      user_id: Set(model.user_id),
      subject_entity_id: Set(model.subject_entity_id),
      predicate: Set(model.predicate),
      predicate_type: Set(model.predicate_type),
      object_value: Set(model.object_value),
      confidence: Set(model.confidence),
      reinforcement_count: Set(model.reinforcement_count),
      last_validated_at: Set(model.last_validated_at),
      source_event_id: Set(model.source_event_id),
      status: Set(model.status),
      embedding: Set(model.embedding),
      created_at: Set(model.created_at),
      updated_at: Set(model.updated_at),
      ..Default::default()
    };
    Ok(active.insert(&self.db).await?)
  }

  async fn apply_reinforce(&self, memory_id: Uuid, diff: ReinforceDiff) -> Result<(), AppError> {
    if let Some(existing) = SemanticMemory::find_by_id(memory_id).one(&self.db).await? {
      let mut active: semantic_memory::ActiveModel = existing.into();
      active.confidence = Set(diff.confidence);
      active.reinforcement_count = Set(diff.reinforcement_count);
      active.last_validated_at = Set(diff.last_validated_at.into());
      active.update(&self.db).await?;
    }
    Ok(())
  }

  async fn mark_status(&self, memory_id: Uuid, status: &str) -> Result<(), AppError> {
    if let Some(existing) = SemanticMemory::find_by_id(memory_id).one(&self.db).await? {
      let mut active: semantic_memory::ActiveModel = existing.into();
      active.status = Set(status.to_owned());
      active.update(&self.db).await?;
    }
    Ok(())
  }

  async fn find_similar(&self, user_id: Uuid, embedding: &PgVector, limit: u64) -> Result<Vec<semantic_memory::Model>, AppError> {
    Ok(
      SemanticMemory::find()
        .filter(semantic_memory::Column::UserId.eq(user_id))
        .filter(semantic_memory::Column::Status.is_in(["active", "aging"]))
        .order_by_asc(Expr::cust_with_values("embedding <=> $1", [embedding.clone()]))
        .limit(limit)
        .all(&self.db)
        .await?,
    )
  }

  async fn find_confirmable(&self, memory_ids: &[Uuid]) -> Result<Vec<semantic_memory::Model>, AppError> {
    Ok(
      SemanticMemory::find()
        .filter(semantic_memory::Column::MemoryId.is_in(memory_ids.to_vec()))
        .all(&self.db)
        .await?,
    )
  }
}

#[async_trait]
impl EpisodicMemoryRepository for PgRepositories {
  async fn insert(&self, model: episodic_memory::Model) -> Result<episodic_memory::Model, AppError> {
    let active = episodic_memory::ActiveModel {
      memory_id: Set(model.memory_id),
      user_id: Set(model.user_id),
      session_id: Set(model.session_id),
      event_type: Set(model.event_type),
      summary: Set(model.summary),
      source_event_ids: Set(model.source_event_ids),
      entities: Set(model.entities),
      importance: Set(model.importance),
      embedding: Set(model.embedding),
      created_at: Set(model.created_at),
      archived_at: Set(model.archived_at),
    };
    Ok(active.insert(&self.db).await?)
  }

  async fn find_similar(&self, user_id: Uuid, embedding: &PgVector, limit: u64) -> Result<Vec<episodic_memory::Model>, AppError> {
    Ok(
      EpisodicMemory::find()
        .filter(episodic_memory::Column::UserId.eq(user_id))
        .filter(episodic_memory::Column::ArchivedAt.is_null())
        .order_by_asc(Expr::cust_with_values("embedding <=> $1", [embedding.clone()]))
        .limit(limit)
        .all(&self.db)
        .await?,
    )
  }

  async fn find_for_entity(&self, user_id: Uuid, entity_id: &str) -> Result<Vec<episodic_memory::Model>, AppError> {
    Ok(
      EpisodicMemory::find()
        .filter(episodic_memory::Column::UserId.eq(user_id))
        .filter(episodic_memory::Column::ArchivedAt.is_null())
        .filter(Expr::cust_with_values("entities @> $1", [serde_json::json!([{"entity_id": entity_id}])]))
        .all(&self.db)
        .await?,
    )
  }

  async fn find_recent_sessions(&self, user_id: Uuid, session_count: usize) -> Result<Vec<episodic_memory::Model>, AppError> {
    let sessions = EpisodicMemory::find()
      .filter(episodic_memory::Column::UserId.eq(user_id))
      .order_by_desc(episodic_memory::Column::CreatedAt)
      .all(&self.db)
      .await?;
    let mut distinct = Vec::new();
    for m in &sessions {
      if !distinct.contains(&m.session_id) {
        distinct.push(m.session_id);
      }
      if distinct.len() >= session_count {
        break;
      }
    }
    Ok(sessions.into_iter().filter(|m| distinct.contains(&m.session_id)).collect())
  }

  async fn mark_archived(&self, memory_ids: &[Uuid], at: DateTime<Utc>) -> Result<(), AppError> {
    for id in memory_ids {
      if let Some(existing) = EpisodicMemory::find_by_id(*id).one(&self.db).await? {
        let mut active: episodic_memory::ActiveModel = existing.into();
        active.archived_at = Set(Some(at.into()));
        active.update(&self.db).await?;
      }
    }
    Ok(())
  }
}

#[async_trait]
impl SummaryRepository for PgRepositories {
  async fn find_active(&self, user_id: Uuid, scope_type: &str, scope_identifier: &str) -> Result<Option<memory_summary::Model>, AppError> {
    Ok(
      MemorySummary::find()
        .filter(memory_summary::Column::UserId.eq(user_id))
        .filter(memory_summary::Column::ScopeType.eq(scope_type))
        .filter(memory_summary::Column::ScopeIdentifier.eq(scope_identifier))
        .filter(memory_summary::Column::Superseded.eq(false))
        .one(&self.db)
        .await?,
    )
  }

  async fn find_similar(&self, user_id: Uuid, embedding: &PgVector, limit: u64) -> Result<Vec<memory_summary::Model>, AppError> {
    Ok(
      MemorySummary::find()
        .filter(memory_summary::Column::UserId.eq(user_id))
        .filter(memory_summary::Column::Superseded.eq(false))
        .order_by_asc(Expr::cust_with_values("embedding <=> $1", [embedding.clone()]))
        .limit(limit)
        .all(&self.db)
        .await?,
    )
  }

  async fn supersede_and_insert(&self, model: memory_summary::Model) -> Result<memory_summary::Model, AppError> {
    let txn = self.db.begin().await?;

    MemorySummary::update_many()
      .col_expr(memory_summary::Column::Superseded, Expr::value(true))
      .filter(memory_summary::Column::UserId.eq(model.user_id))
      .filter(memory_summary::Column::ScopeType.eq(model.scope_type.clone()))
      .filter(memory_summary::Column::ScopeIdentifier.eq(model.scope_identifier.clone()))
      .exec(&txn)
      .await?;

    let active = memory_summary::ActiveModel {
      summary_id: Set(model.summary_id),
      user_id: Set(model.user_id),
      scope_type: Set(model.scope_type),
      scope_identifier: Set(model.scope_identifier),
      summary_text: Set(model.summary_text),
      key_facts: Set(model.key_facts),
      source_data: Set(model.source_data),
      source_memory_ids: Set(model.source_memory_ids),
      superseded: Set(false),
      confidence: Set(model.confidence),
      embedding: Set(model.embedding),
      created_at: Set(model.created_at),
    };
    let inserted = active.insert(&txn).await?;
    txn.commit().await?;
    Ok(inserted)
  }
}

#[async_trait]
impl ConflictRepository for PgRepositories {
  async fn insert(&self, model: memory_conflict::Model) -> Result<memory_conflict::Model, AppError> {
    let active = memory_conflict::ActiveModel {
      conflict_id: Set(model.conflict_id),
      memory_a: Set(model.memory_a),
      memory_b: Set(model.memory_b),
      conflict_type: Set(model.conflict_type),
      resolution: Set(model.resolution),
      detected_at: Set(model.detected_at),
      resolved_at: Set(model.resolved_at),
    };
    Ok(active.insert(&self.db).await?)
  }
}

#[async_trait]
impl ProceduralMemoryRepository for PgRepositories {
  async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<procedural_memory::Model>, AppError> {
    Ok(ProceduralMemory::find().filter(procedural_memory::Column::UserId.eq(user_id)).all(&self.db).await?)
  }

  async fn find_by_trigger_pattern(&self, user_id: Uuid, trigger_pattern: &str) -> Result<Option<procedural_memory::Model>, AppError> {
    Ok(
      ProceduralMemory::find()
        .filter(procedural_memory::Column::UserId.eq(user_id))
        .filter(procedural_memory::Column::TriggerPattern.eq(trigger_pattern))
        .one(&self.db)
        .await?,
    )
  }

  async fn insert(&self, model: procedural_memory::Model) -> Result<procedural_memory::Model, AppError> {
    let active = procedural_memory::ActiveModel {
      memory_id: Set(model.memory_id),
      user_id: Set(model.user_id),
      trigger_pattern: Set(model.trigger_pattern),
      trigger_features: Set(model.trigger_features),
      action_structure: Set(model.action_structure),
      observed_count: Set(model.observed_count),
      confidence: Set(model.confidence),
      embedding: Set(model.embedding),
      created_at: Set(model.created_at),
    };
    Ok(active.insert(&self.db).await?)
  }

  async fn reinforce(&self, memory_id: Uuid, observed_count: i32, confidence: f64) -> Result<(), AppError> {
    if let Some(existing) = ProceduralMemory::find_by_id(memory_id).one(&self.db).await? {
      let mut active: procedural_memory::ActiveModel = existing.into();
      active.observed_count = Set(observed_count);
      active.confidence = Set(confidence);
      active.update(&self.db).await?;
    }
    Ok(())
  }
}

/// Port onto the external business database, backed here by the local
/// `domain_*` fixture schema. A production deployment swaps this struct for
/// one pointed at the real, separately owned database — the trait is the
/// seam.
pub struct FixtureDomainDb {
  pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct InvoiceStatusRow {
  invoice_id: Uuid,
  invoice_number: String,
  amount: f64,
  status: String,
  due_date: chrono::NaiveDate,
  paid: f64,
}

#[derive(Debug, FromQueryResult)]
struct OrderChainRow {
  sales_order_id: Uuid,
  order_number: String,
  order_status: String,
  work_order_count: i64,
  open_work_orders: i64,
  invoice_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct SlaRiskRow {
  task_id: Uuid,
  description: String,
  status: String,
  age_days: f64,
}

#[async_trait]
impl DomainDbPort for FixtureDomainDb {
  async fn invoice_status(&self, customer_external_id: &str) -> Result<Vec<DomainFact>, AppError> {
    let customer_id = Uuid::parse_str(customer_external_id)?;
    let stmt = Statement::from_sql_and_values(
      self.db.get_database_backend(),
      r"
      SELECT i.id AS invoice_id, i.invoice_number AS invoice_number, i.amount AS amount,
             i.status AS status, i.due_date AS due_date,
             COALESCE(SUM(p.amount), 0) AS paid
      FROM domain_invoice i
      LEFT JOIN domain_payment p ON p.invoice_id = i.id
      WHERE i.customer_id = $1
      GROUP BY i.id
      ORDER BY i.due_date DESC
      ",
      [customer_id.into()],
    );
    let rows = InvoiceStatusRow::find_by_statement(stmt).all(&self.db).await?;
    let retrieved_at = Utc::now();
    Ok(
      rows
        .into_iter()
        .map(|r| DomainFact {
          fact_type: "invoice_status".to_owned(),
          entity_id: format!("customer:{customer_external_id}"),
          content: serde_json::json!({
            "invoice_number": r.invoice_number,
            "amount": r.amount,
            "status": r.status,
            "due_date": r.due_date.to_string(),
            "balance": r.amount - r.paid,
          }),
          metadata: serde_json::json!({}),
          source_table: "domain_invoice".to_owned(),
          source_rows: vec![r.invoice_id.to_string()],
          retrieved_at,
        })
        .collect(),
    )
  }

  async fn order_chain(&self, order_number: &str) -> Result<Vec<DomainFact>, AppError> {
    let stmt = Statement::from_sql_and_values(
      self.db.get_database_backend(),
      r"
      SELECT so.id AS sales_order_id, so.order_number AS order_number, so.status AS order_status,
             COUNT(DISTINCT wo.id) AS work_order_count,
             COUNT(DISTINCT wo.id) FILTER (WHERE wo.status <> 'complete') AS open_work_orders,
             COUNT(DISTINCT inv.id) AS invoice_count
      FROM domain_sales_order so
      LEFT JOIN domain_work_order wo ON wo.sales_order_id = so.id
      LEFT JOIN domain_invoice inv ON inv.sales_order_id = so.id
      WHERE so.order_number = $1
      GROUP BY so.id
      ",
      [order_number.into()],
    );
    let Some(row) = OrderChainRow::find_by_statement(stmt).one(&self.db).await? else {
      return Ok(Vec::new());
    };

    let recommended_action = if row.work_order_count == 0 {
      "create_work_orders"
    } else if row.open_work_orders > 0 {
      "complete_work_orders"
    } else if row.invoice_count == 0 {
      "generate_invoice"
    } else {
      "track_payment"
    };

    Ok(vec![DomainFact {
      fact_type: "order_chain".to_owned(),
      entity_id: format!("sales_order:{}", row.sales_order_id),
      content: serde_json::json!({
        "order_number": row.order_number,
        "order_status": row.order_status,
        "work_order_count": row.work_order_count,
        "open_work_orders": row.open_work_orders,
        "invoice_count": row.invoice_count,
        "recommended_action": recommended_action,
      }),
      metadata: serde_json::json!({}),
      source_table: "domain_sales_order".to_owned(),
      source_rows: vec![row.sales_order_id.to_string()],
      retrieved_at: Utc::now(),
    }])
  }

  async fn sla_risk(&self, customer_external_id: &str, age_threshold_days: i64) -> Result<Vec<DomainFact>, AppError> {
    let customer_id = Uuid::parse_str(customer_external_id)?;
    let stmt = Statement::from_sql_and_values(
      self.db.get_database_backend(),
      r"
      SELECT id AS task_id, description, status,
             EXTRACT(EPOCH FROM (now() - created_at))/86400.0 AS age_days
      FROM domain_task
      WHERE customer_id = $1 AND status <> 'done'
        AND EXTRACT(EPOCH FROM (now() - created_at))/86400.0 > $2
      ",
      [customer_id.into(), (age_threshold_days as f64).into()],
    );
    let rows = SlaRiskRow::find_by_statement(stmt).all(&self.db).await?;
    let retrieved_at = Utc::now();
    Ok(
      rows
        .into_iter()
        .map(|r| {
          let label = if r.age_days > age_threshold_days as f64 * 2.0 { "high" } else { "medium" };
          DomainFact {
            fact_type: "sla_risk".to_owned(),
            entity_id: format!("customer:{customer_external_id}"),
            content: serde_json::json!({
              "description": r.description,
              "status": r.status,
              "age_days": r.age_days,
              "risk": label,
            }),
            metadata: serde_json::json!({}),
            source_table: "domain_task".to_owned(),
            source_rows: vec![r.task_id.to_string()],
            retrieved_at,
          }
        })
        .collect(),
    )
  }

  async fn work_orders(&self, customer_external_id: &str) -> Result<Vec<DomainFact>, AppError> {
    let customer_id = Uuid::parse_str(customer_external_id)?;
    let stmt = Statement::from_sql_and_values(
      self.db.get_database_backend(),
      r"
      SELECT wo.id, wo.status, wo.created_at
      FROM domain_work_order wo
      JOIN domain_sales_order so ON so.id = wo.sales_order_id
      WHERE so.customer_id = $1
      ORDER BY wo.created_at DESC
      ",
      [customer_id.into()],
    );
    #[derive(Debug, FromQueryResult)]
    struct Row {
      id: Uuid,
      status: String,
      created_at: chrono::NaiveDate,
    }
    let rows = Row::find_by_statement(stmt).all(&self.db).await?;
    let retrieved_at = Utc::now();
    Ok(
      rows
        .into_iter()
        .map(|r| DomainFact {
          fact_type: "work_order".to_owned(),
          entity_id: format!("customer:{customer_external_id}"),
          content: serde_json::json!({ "status": r.status, "created_at": r.created_at.to_string() }),
          metadata: serde_json::json!({}),
          source_table: "domain_work_order".to_owned(),
          source_rows: vec![r.id.to_string()],
          retrieved_at,
        })
        .collect(),
    )
  }

  async fn tasks(&self, customer_external_id: &str) -> Result<Vec<DomainFact>, AppError> {
    let customer_id = Uuid::parse_str(customer_external_id)?;
    let stmt = Statement::from_sql_and_values(
      self.db.get_database_backend(),
      "SELECT id, description, status, created_at FROM domain_task WHERE customer_id = $1 ORDER BY created_at DESC",
      [customer_id.into()],
    );
    #[derive(Debug, FromQueryResult)]
    struct Row {
      id: Uuid,
      description: String,
      status: String,
      created_at: chrono::NaiveDate,
    }
    let rows = Row::find_by_statement(stmt).all(&self.db).await?;
    let retrieved_at = Utc::now();
    Ok(
      rows
        .into_iter()
        .map(|r| DomainFact {
          fact_type: "task".to_owned(),
          entity_id: format!("customer:{customer_external_id}"),
          content: serde_json::json!({ "description": r.description, "status": r.status, "created_at": r.created_at.to_string() }),
          metadata: serde_json::json!({}),
          source_table: "domain_task".to_owned(),
          source_rows: vec![r.id.to_string()],
          retrieved_at,
        })
        .collect(),
    )
  }

  async fn find_customer_by_name(&self, name: &str) -> Result<Option<(Uuid, String)>, AppError> {
    #[derive(Debug, FromQueryResult)]
    struct Row {
      id: Uuid,
      name: String,
    }
    let stmt = Statement::from_sql_and_values(
      self.db.get_database_backend(),
      "SELECT id, name FROM domain_customer WHERE similarity(name, $1) > 0.4 ORDER BY similarity(name, $1) DESC LIMIT 1",
      [name.into()],
    );
    let row = Row::find_by_statement(stmt).one(&self.db).await?;
    Ok(row.map(|r| (r.id, r.name)))
  }
}
