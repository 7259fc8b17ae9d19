use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::{
    evidence::{
        DeviceLocation, EvidenceRecord, Fingerprint, GeoForensics, IntegrityScore, SealedVerdict,
    },
    exif_guard, fingerprint, integrity,
    ledger::EvidenceLedger,
    signer::VerdictSigner,
};

// ==========================================
// 1. 应用状态 (Shared State)
// ==========================================
// 所有 HTTP 请求共享。核验本身是纯函数不需要锁；
// 台账是追加写，用 Mutex 串行化。
pub struct AppState {
    pub signer: Arc<VerdictSigner>,
    pub ledger: Arc<Mutex<EvidenceLedger>>,
}

// ==========================================
// 2. 数据传输对象 (DTOs)
// ==========================================

// 请求：提交证据。图片由上传层先落盘，这里只收路径；
// 设备坐标由前端定位 API 获取，定位失败时前端负责给兜底值。
#[derive(Deserialize)]
pub struct SubmitRequest {
    pub image_path: String,
    pub device_latitude: f64,
    pub device_longitude: f64,
}

// 响应：核验回执。integrity 两个标量 (score/badge) 由调用方
// 挂到工单记录上，root/pos/signature 是可独立复验的存证凭据。
#[derive(Serialize)]
pub struct SubmitReceipt {
    pub integrity: IntegrityScore,
    pub forensics: GeoForensics,
    pub fingerprint: Fingerprint,
    pub root_hash: String,
    pub leaf_pos: u64,
    pub signature: String, // Hex encoded
}

// 响应：审计证明
#[derive(Serialize)]
pub struct AuditResponse {
    pub leaf_pos: u64,
    pub proof_hex: Vec<String>, // proof path 转 Hex 数组方便前端展示
    pub record: Option<EvidenceRecord>,
}

// ==========================================
// 3. API 路由构建
// ==========================================
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/submit", post(submit_evidence))
        .route("/audit/{pos}", get(get_audit_proof))
        .layer(CorsLayer::permissive()) // ⚠️ 开发模式：允许所有跨域
        .with_state(state)
}

// ==========================================
// 4. 处理函数 (Handlers)
// ==========================================

/// 接口：提交证据 -> 取证 -> 评分 -> 封签入账
async fn submit_evidence(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitReceipt>, (StatusCode, String)> {
    println!(
        "📥 收到举报证据: 图片={}, 设备坐标=({}, {})",
        req.image_path, req.device_latitude, req.device_longitude
    );

    // 文件读取 + EXIF 解码 + pHash 都是阻塞型工作，移出异步线程。
    // 注意取证/指纹本身不失败；只有文件读不到才报错。
    let image_path = req.image_path.clone();
    let (fingerprint, forensics) = tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&image_path)
            .map_err(|e| anyhow::anyhow!("证据文件读取失败 {}: {}", image_path, e))?;
        Ok::<_, anyhow::Error>((
            fingerprint::generate_fingerprints(&bytes),
            exif_guard::analyze_evidence(&bytes),
        ))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join error: {}", e)))?
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let device = DeviceLocation {
        latitude: req.device_latitude,
        longitude: req.device_longitude,
    };
    let verdict_score = integrity::calculate_integrity(&forensics, &device);

    let record = EvidenceRecord {
        fingerprint,
        forensics,
        device,
        integrity: verdict_score.clone(),
        reported_at: chrono::Utc::now().timestamp(),
    };

    let sealed = SealedVerdict {
        record_digest: record
            .digest()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
        integrity: verdict_score.clone(),
        sealed_at: record.reported_at,
    };

    let signature = state
        .signer
        .sign(&sealed)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let (root, pos) = {
        let mut ledger = state.ledger.lock().await;
        ledger
            .append(&sealed, &record)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    };

    println!(
        "✅ 封签入账: badge={:?}, score={}, root={}, pos={}",
        verdict_score.badge,
        verdict_score.score,
        hex::encode(root),
        pos
    );

    Ok(Json(SubmitReceipt {
        integrity: verdict_score,
        forensics: record.forensics,
        fingerprint: record.fingerprint,
        root_hash: hex::encode(root),
        leaf_pos: pos,
        signature: hex::encode(signature.to_bytes()),
    }))
}

/// 接口：按存证位置获取审计证明
async fn get_audit_proof(
    State(state): State<Arc<AppState>>,
    Path(pos): Path<u64>,
) -> Result<Json<AuditResponse>, (StatusCode, String)> {
    println!("🔍 收到审计请求: Pos={}", pos);

    let ledger = state.ledger.lock().await;

    let proof = ledger
        .get_proof(vec![pos])
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("获取 Proof 失败: {}", e)))?;

    let record = ledger
        .get_record(pos)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let proof_hex: Vec<String> = proof
        .proof_items()
        .iter()
        .map(|hash| hex::encode(hash))
        .collect();

    Ok(Json(AuditResponse {
        leaf_pos: pos,
        proof_hex,
        record,
    }))
}
