mod rag_ranking;
