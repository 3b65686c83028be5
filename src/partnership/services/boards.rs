//! Board manager: the shared-board read model and renaming.

use crate::error::{Classify, ErrorKind};
use crate::partnership::{
    domain::{Board, BoardId, BoardName, PartnershipDomainError, UserId},
    ports::{PartnershipRepository, PartnershipRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The calling account does not exist.
    #[error("calling account {0} not found")]
    CallerNotFound(UserId),

    /// The board does not exist.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// The caller is not one of the board's two members. Always preferred
    /// over `BoardNotFound` for an existing board, so membership is what
    /// gates knowledge of a board's existence.
    #[error("user {0} is not a member of this board")]
    NotBoardMember(UserId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PartnershipDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] PartnershipRepositoryError),
}

impl Classify for BoardError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::CallerNotFound(_) => ErrorKind::Unauthorized,
            Self::BoardNotFound(_) => ErrorKind::NotFound,
            Self::NotBoardMember(_) => ErrorKind::Forbidden,
            Self::Domain(_) => ErrorKind::Validation,
            Self::Repository(err) => match err {
                PartnershipRepositoryError::BoardNotFound(_) => ErrorKind::NotFound,
                PartnershipRepositoryError::Persistence(_) => ErrorKind::Internal,
                _ => ErrorKind::Conflict,
            },
        }
    }
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Read model for the caller's home view: who they are, how many invites
/// await them, and their board if partnered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardOverview {
    /// The caller's display name.
    pub username: String,
    /// Pending invites addressed to the caller.
    pub pending_invite_count: u64,
    /// The caller's shared board, or `None` while unpartnered.
    pub board: Option<Board>,
}

/// Board manager orchestration service.
#[derive(Clone)]
pub struct BoardService<R>
where
    R: PartnershipRepository,
{
    repository: Arc<R>,
}

impl<R> BoardService<R>
where
    R: PartnershipRepository,
{
    /// Creates a new board service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the caller's board overview.
    ///
    /// Boards are created only on the invite accept path, so a partnered
    /// caller with no board simply reads `None`; nothing is lazily created
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CallerNotFound`] for an unknown caller or a
    /// repository error on lookup failure.
    pub async fn overview(&self, caller_id: UserId) -> BoardResult<BoardOverview> {
        let user = self
            .repository
            .find_user(caller_id)
            .await?
            .ok_or(BoardError::CallerNotFound(caller_id))?;
        let pending_invite_count = self.repository.count_pending_invites_for(caller_id).await?;
        let board = if user.is_partnered() {
            self.repository.find_board_for_member(caller_id).await?
        } else {
            None
        };

        Ok(BoardOverview {
            username: user.name().to_owned(),
            pending_invite_count,
            board,
        })
    }

    /// Renames a board on behalf of one of its members.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BoardNotFound`] for a missing board,
    /// [`BoardError::NotBoardMember`] for a non-member caller, or a domain
    /// error for an empty name.
    pub async fn rename_board(
        &self,
        caller_id: UserId,
        board_id: BoardId,
        new_name: &str,
    ) -> BoardResult<Board> {
        let name = BoardName::new(new_name)?;
        let mut board = self
            .repository
            .find_board(board_id)
            .await?
            .ok_or(BoardError::BoardNotFound(board_id))?;
        if !board.has_member(caller_id) {
            return Err(BoardError::NotBoardMember(caller_id));
        }

        self.repository.rename_board(board_id, &name).await?;
        board.rename(name);
        tracing::debug!(board_id = %board_id, "board renamed");
        Ok(board)
    }
}
