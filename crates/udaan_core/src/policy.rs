//! crates/udaan_core/src/policy.rs
//!
//! The single authorization decision point. Every guarded operation builds
//! an [`Action`] carrying the data the decision needs and asks
//! [`authorize`] whether the caller may proceed.

use uuid::Uuid;

use crate::domain::{Identity, Role};

/// An operation a caller may attempt, paired with the resource facts the
/// decision depends on. `job_owner` is the recruiter recorded on the job,
/// when one is recorded at all.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// Submit an application on behalf of `student_id`.
    SubmitApplication { student_id: Uuid },
    /// Withdraw an existing application.
    WithdrawApplication {
        applicant: Uuid,
        job_owner: Option<Uuid>,
    },
    /// List the applications of `student_id`.
    ListStudentApplications { student_id: Uuid },
    /// List the applications received by a job.
    ListJobApplications { job_owner: Option<Uuid> },
    /// Change the review status of an application.
    ReviewApplication { job_owner: Option<Uuid> },
    /// Update the profile of `user_id`.
    UpdateProfile { user_id: Uuid },
}

/// Decides whether `identity` may perform `action`.
///
/// Jobs without a recorded recruiter are reviewable by any recruiter;
/// locking them to admins would orphan review of seeded postings.
pub fn authorize(identity: &Identity, action: &Action) -> bool {
    match *action {
        Action::SubmitApplication { student_id } => {
            identity.role == Role::Student && identity.user_id == student_id
        }
        Action::WithdrawApplication {
            applicant,
            job_owner,
        } => identity.user_id == applicant || reviews_for(identity, job_owner),
        Action::ListStudentApplications { student_id } => {
            identity.user_id == student_id || identity.role == Role::Admin
        }
        Action::ListJobApplications { job_owner } => reviews_for(identity, job_owner),
        Action::ReviewApplication { job_owner } => reviews_for(identity, job_owner),
        Action::UpdateProfile { user_id } => {
            identity.role == Role::Student && identity.user_id == user_id
        }
    }
}

/// Whether the identity holds review privilege over a job: an admin, or a
/// recruiter matching the job's recorded owner (any recruiter when the
/// job has none).
fn reviews_for(identity: &Identity, job_owner: Option<Uuid>) -> bool {
    match identity.role {
        Role::Admin => true,
        Role::Recruiter => job_owner.is_none() || job_owner == Some(identity.user_id),
        Role::Student => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn only_the_student_themselves_may_apply() {
        let student = identity(Role::Student);
        assert!(authorize(
            &student,
            &Action::SubmitApplication {
                student_id: student.user_id
            }
        ));
        assert!(!authorize(
            &student,
            &Action::SubmitApplication {
                student_id: Uuid::new_v4()
            }
        ));
        let admin = identity(Role::Admin);
        assert!(!authorize(
            &admin,
            &Action::SubmitApplication {
                student_id: admin.user_id
            }
        ));
    }

    #[test]
    fn job_listings_require_review_privilege() {
        let owner = Uuid::new_v4();
        let action = Action::ListJobApplications {
            job_owner: Some(owner),
        };

        assert!(!authorize(&identity(Role::Student), &action));
        assert!(authorize(&identity(Role::Admin), &action));

        let other_recruiter = identity(Role::Recruiter);
        assert!(!authorize(&other_recruiter, &action));
        let owning_recruiter = Identity {
            user_id: owner,
            role: Role::Recruiter,
        };
        assert!(authorize(&owning_recruiter, &action));
    }

    #[test]
    fn unowned_jobs_are_reviewable_by_any_recruiter() {
        let action = Action::ReviewApplication { job_owner: None };
        assert!(authorize(&identity(Role::Recruiter), &action));
        assert!(!authorize(&identity(Role::Student), &action));
    }

    #[test]
    fn withdrawal_is_owner_or_reviewer() {
        let applicant = Uuid::new_v4();
        let action = Action::WithdrawApplication {
            applicant,
            job_owner: Some(Uuid::new_v4()),
        };

        let owner = Identity {
            user_id: applicant,
            role: Role::Student,
        };
        assert!(authorize(&owner, &action));
        assert!(!authorize(&identity(Role::Student), &action));
        assert!(authorize(&identity(Role::Admin), &action));
    }

    #[test]
    fn profile_updates_are_student_self_only() {
        let student = identity(Role::Student);
        assert!(authorize(
            &student,
            &Action::UpdateProfile {
                user_id: student.user_id
            }
        ));
        let recruiter = identity(Role::Recruiter);
        assert!(!authorize(
            &recruiter,
            &Action::UpdateProfile {
                user_id: recruiter.user_id
            }
        ));
    }
}
