use crate::database::attendance::{ALREADY_MARKED, AttendanceRepository};
use crate::database::qr_session::QrSessionRepository;
use crate::error::app_error::AppError;
use crate::models::attendance::AttendanceRecord;
use crate::models::qr_session::{QrPayload, QrSession, QrSessionRequest, QrSessionResponse};
use crate::models::timetable::{Day, Timetable, TimetablePeriod};
use crate::models::user::{ClassSection, User};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use qrcode::{EcLevel, QrCode};
use serde::Serialize;
use uuid::Uuid;

/// Case-insensitive substring match in either direction, so "Math"
/// matches "Mathematics" and vice versa. Deliberately permissive; the
/// section check at redemption time is the strict one.
pub fn fuzzy_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

pub fn matches_any_subject(subjects: &[String], candidate: &str) -> bool {
    subjects.iter().any(|subject| fuzzy_match(subject, candidate))
}

fn parse_end_of_slot(label: &str) -> Option<(u32, u32)> {
    let (_, end) = label.split_once('-')?;
    let (hour, minute) = end.trim().split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Expiry for a time-slot label like "09:30-10:30": today at the slot's
/// end time, rolled forward one day if that moment has already passed.
/// Only the clock time matters, never the day the slot is scheduled on.
/// Labels that do not parse fall back to one hour from now; degraded
/// input must still produce a usable session.
pub fn expiry_for_time_slot(label: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let candidate = parse_end_of_slot(label).and_then(|(hour, minute)| {
        now.with_hour(hour)?.with_minute(minute)?.with_second(0)?.with_nanosecond(0)
    });

    match candidate {
        Some(expiry) if expiry > now => expiry,
        Some(expiry) => expiry + Duration::days(1),
        None => now + Duration::hours(1),
    }
}

/// "09:30" as the integer 930. Clock times in range labels must be
/// compared numerically; "09:05" < "10:00" as strings but 905 < 1000 is
/// the comparison that stays correct without zero padding.
fn hhmm_value(clock: &str) -> Option<u32> {
    let (hour, minute) = clock.trim().split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    Some(hour * 100 + minute)
}

/// Whether a range label contains the given HHMM value, inclusive on both
/// ends. Unparseable ranges never match.
fn time_range_contains(range: &str, now_hhmm: u32) -> bool {
    let Some((start, end)) = range.split_once('-') else {
        return false;
    };
    match (hhmm_value(start), hhmm_value(end)) {
        (Some(start), Some(end)) => start <= now_hhmm && now_hhmm <= end,
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivePeriod {
    pub day: Day,
    pub class_section: ClassSection,
    pub period: TimetablePeriod,
}

/// Scans the timetable for periods happening right now whose subject or
/// short code fuzzy-matches one of the caller's subjects, across all
/// sections. Lets a teacher pick "the class happening now" instead of
/// typing the parameters.
pub fn find_currently_active_periods(timetable: &Timetable, subjects: &[String], now: DateTime<Utc>) -> Vec<ActivePeriod> {
    let day = Day::from(now.weekday());
    let now_hhmm = now.hour() * 100 + now.minute();

    let Some(sections) = timetable.days.get(&day) else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    for (section, periods) in sections {
        for period in periods {
            let subject_matches =
                matches_any_subject(subjects, &period.subject) || matches_any_subject(subjects, &period.class_code);
            if subject_matches && time_range_contains(&period.time, now_hhmm) {
                matches.push(ActivePeriod {
                    day,
                    class_section: *section,
                    period: period.clone(),
                });
            }
        }
    }
    matches
}

/// Renders the payload as a QR code and returns it as a base64 SVG data
/// URL the issuing client can display or print.
pub fn encode_qr_image(data: &str) -> Result<String, AppError> {
    let qr = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| AppError::qr_encoding(format!("Failed to generate QR code: {}", e)))?;

    let svg = qr
        .render::<qrcode::render::svg::Color>()
        .quiet_zone(true)
        .min_dimensions(250, 250)
        .build();

    let encoded = general_purpose::STANDARD.encode(svg.as_bytes());
    Ok(format!("data:image/svg+xml;base64,{}", encoded))
}

/// The QR session manager: mints time-bounded attendance opportunities
/// and runs the redemption pipeline. Generic over the repositories so
/// the pipeline is testable without Postgres.
pub struct AttendanceService<'a, R>
where
    R: QrSessionRepository + AttendanceRepository + Sync,
{
    pub repo: &'a R,
}

impl<'a, R> AttendanceService<'a, R>
where
    R: QrSessionRepository + AttendanceRepository + Sync,
{
    pub async fn create_session(
        &self,
        issuer: &User,
        request: &QrSessionRequest,
        now: DateTime<Utc>,
    ) -> Result<QrSessionResponse, AppError> {
        if !issuer.role.can_issue_sessions() {
            return Err(AppError::Forbidden("Only teachers can generate QR codes".to_string()));
        }

        // Soft check only: the auto-issue path below skips it entirely.
        if let Some(subjects) = &issuer.subjects
            && !subjects.is_empty()
            && !matches_any_subject(subjects, &request.subject)
        {
            return Err(AppError::Forbidden(format!(
                "You are not assigned to teach {}",
                request.subject
            )));
        }

        self.mint_session(
            issuer,
            request.class_section,
            &request.subject,
            &request.class_code,
            &request.time_slot,
            now,
        )
        .await
    }

    /// Issues a session for a period the active-class helper already
    /// matched against the issuer's subjects. No further subject check on
    /// purpose; the helper's own fuzzy match is the only filter, matching
    /// the manual path's permissiveness.
    pub async fn create_session_for_period(
        &self,
        issuer: &User,
        active: &ActivePeriod,
        now: DateTime<Utc>,
    ) -> Result<QrSessionResponse, AppError> {
        if !issuer.role.can_issue_sessions() {
            return Err(AppError::Forbidden("Only teachers can generate QR codes".to_string()));
        }

        self.mint_session(
            issuer,
            active.class_section,
            &active.period.subject,
            &active.period.class_code,
            &active.period.time,
            now,
        )
        .await
    }

    async fn mint_session(
        &self,
        issuer: &User,
        class_section: ClassSection,
        subject: &str,
        class_code: &str,
        time_slot: &str,
        now: DateTime<Utc>,
    ) -> Result<QrSessionResponse, AppError> {
        let session_id = Uuid::new_v4();
        let payload = QrPayload {
            session_id,
            teacher_id: issuer.id,
            class_section,
            subject: subject.to_string(),
            time_slot: time_slot.to_string(),
            created_at: now,
        };

        let qr_data =
            serde_json::to_string(&payload).map_err(|e| AppError::qr_encoding(format!("Failed to serialize QR payload: {}", e)))?;
        let qr_image = encode_qr_image(&qr_data)?;
        let expires_at = expiry_for_time_slot(time_slot, now);

        let session = QrSession {
            id: session_id,
            teacher_id: issuer.id,
            teacher_name: issuer.full_name.clone(),
            class_section,
            subject: subject.to_string(),
            class_code: class_code.to_string(),
            time_slot: time_slot.to_string(),
            qr_data: qr_data.clone(),
            created_at: now,
            expires_at,
            is_active: true,
        };
        self.repo.insert_qr_session(&session).await?;

        Ok(QrSessionResponse {
            session_id,
            qr_image,
            qr_data,
            expires_at,
            class_section,
            subject: subject.to_string(),
            time_slot: time_slot.to_string(),
        })
    }

    /// The redemption pipeline. The checks run unconditionally and in
    /// this order: decode, lookup, liveness, role and section, duplicate.
    /// A malformed payload must never reach the store, and a missing
    /// session reports not-found rather than expired.
    pub async fn mark_attendance(&self, student: &User, qr_data: &str, now: DateTime<Utc>) -> Result<AttendanceRecord, AppError> {
        let payload: QrPayload =
            serde_json::from_str(qr_data).map_err(|_| AppError::BadRequest("Invalid QR code format".to_string()))?;

        let session = self
            .repo
            .get_qr_session(&payload.session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid QR code".to_string()))?;

        // Liveness is evaluated here, at redemption time. A session can
        // expire while sitting unredeemed.
        if !session.is_active || now > session.expires_at {
            return Err(AppError::BadRequest("QR code has expired".to_string()));
        }

        if !student.role.can_redeem() {
            return Err(AppError::Forbidden("Only students can mark attendance".to_string()));
        }
        let student_id = student
            .student_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("No student id registered for this account".to_string()))?;

        // Strict equality, unlike the fuzzy subject match at creation.
        if student.class_section != Some(session.class_section) {
            return Err(AppError::BadRequest("You are not enrolled in this class section".to_string()));
        }

        // Early exit; the unique constraint behind insert_attendance is
        // what actually wins the race.
        if self.repo.get_attendance(student_id, &session.id).await?.is_some() {
            return Err(AppError::Conflict(ALREADY_MARKED.to_string()));
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            student_id: student_id.to_string(),
            student_name: student.full_name.clone(),
            qr_session_id: session.id,
            class_section: session.class_section,
            subject: session.subject.clone(),
            class_code: session.class_code.clone(),
            time_slot: session.time_slot.clone(),
            marked_at: now,
        };
        self.repo.insert_attendance(&record).await?;

        Ok(record)
    }

    /// Record visibility: students see their own, teachers see their
    /// sessions' records, admin-tier roles see everything, everyone else
    /// sees nothing.
    pub async fn records_for(&self, user: &User) -> Result<Vec<AttendanceRecord>, AppError> {
        match user.role {
            crate::models::user::Role::Student => match &user.student_id {
                Some(student_id) => self.repo.list_attendance_for_student(student_id).await,
                None => Ok(Vec::new()),
            },
            crate::models::user::Role::Teacher => self.repo.list_attendance_for_issuer(&user.id).await,
            role if role.can_see_all_records() => self.repo.list_all_attendance().await,
            _ => Ok(Vec::new()),
        }
    }
}
